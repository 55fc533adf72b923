use crate::areas::repository::{GIT_DIR, Repository};
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::Result;
use std::fs;
use std::path::Path;

const DEFAULT_BRANCH: &str = "main";

impl Repository {
    /// Create the on-disk layout for a fresh repository and return a
    /// handle to it: the objects directory, the heads directory, and a
    /// symbolic HEAD pointing at the (still unborn) default branch.
    pub fn init(path: &Path) -> Result<Self> {
        let git_path = path.join(GIT_DIR);
        if git_path.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} is already a repository", path.display()),
            )
            .into());
        }

        let repository = Self::attach(path);

        fs::create_dir_all(repository.database().objects_path())?;
        fs::create_dir_all(repository.refs().heads_path())?;

        let default_branch = BranchName::try_parse(DEFAULT_BRANCH.to_string())?;
        repository.refs().init_head(&default_branch)?;

        tracing::debug!(path = %repository.path().display(), "initialized empty repository");
        Ok(repository)
    }
}
