use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::errors::{Error, Result};

/// Validated branch name, the `<branch>` in `refs/heads/<branch>`.
///
/// Hierarchical names (`feature/login`) are allowed; the ref store creates
/// the intermediate directories when writing them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidBranchName("branch name cannot be empty".to_string()));
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        if re.is_match(&name) {
            return Err(Error::InvalidBranchName(name));
        }

        Ok(Self(name))
    }

    /// Ref path relative to the git directory.
    pub fn ref_path(&self) -> String {
        format!("refs/heads/{}", self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
