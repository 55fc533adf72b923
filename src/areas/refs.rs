//! References (branches and HEAD)
//!
//! References are human-readable names pointing at commits:
//!
//! - `HEAD`: text file `ref: refs/heads/<branch>\n`, the symbolic pointer
//!   to the current branch
//! - `refs/heads/<branch>`: text file holding the branch tip's hex digest
//! - `packed-refs`: optional fallback table, one `<hex-digest>
//!   <full-ref-name>` per line
//!
//! Ref files are overwritten whole on every update; the single-process
//! precondition means no lock is taken around them.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use derive_new::new;
use std::path::{Path, PathBuf};

/// Pattern of the symbolic HEAD form, capturing the branch name
const HEAD_SYMREF_REGEX: &str = r"^ref: refs/heads/(.+)$";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the git directory
    path: Box<Path>,
}

impl Refs {
    /// Branch that HEAD points at.
    ///
    /// Fails with [`Error::DetachedOrMissingHead`] when HEAD is absent or
    /// holds a raw digest instead of the symbolic form.
    pub fn head_branch(&self) -> Result<BranchName> {
        let content = match std::fs::read_to_string(self.head_path()) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::DetachedOrMissingHead);
            }
            Err(error) => return Err(error.into()),
        };

        let re = regex::Regex::new(HEAD_SYMREF_REGEX)
            .map_err(|error| std::io::Error::new(std::io::ErrorKind::InvalidInput, error))?;

        match re.captures(content.trim()) {
            Some(captures) => BranchName::try_parse(captures[1].to_string()),
            None => Err(Error::DetachedOrMissingHead),
        }
    }

    /// Tip commit of a branch.
    ///
    /// Falls back to the packed-refs table when the direct ref file is
    /// absent; a brand-new branch with no tip anywhere is `Ok(None)`.
    pub fn tip_of(&self, branch: &BranchName) -> Result<Option<ObjectId>> {
        let ref_path = self.heads_path().join(branch.as_ref());

        match std::fs::read_to_string(&ref_path) {
            Ok(content) => {
                let content = content.trim();
                if content.is_empty() {
                    return Ok(None);
                }
                Ok(Some(ObjectId::try_parse(content.to_string())?))
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                self.packed_tip_of(branch)
            }
            Err(error) => Err(error.into()),
        }
    }

    fn packed_tip_of(&self, branch: &BranchName) -> Result<Option<ObjectId>> {
        let content = match std::fs::read_to_string(self.path.join("packed-refs")) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        for line in content.lines() {
            // comment and peeled-tag annotation lines
            if line.starts_with('#') || line.starts_with('^') {
                continue;
            }
            let Some((digest, ref_name)) = line.split_once(' ') else {
                continue;
            };
            if ref_name.trim() == branch.ref_path() {
                return Ok(Some(ObjectId::try_parse(digest.to_string())?));
            }
        }

        Ok(None)
    }

    /// Point the branch at a new tip, creating ref directories as needed
    /// for hierarchical branch names.
    pub fn set_tip(&self, branch: &BranchName, oid: &ObjectId) -> Result<()> {
        let ref_path = self.heads_path().join(branch.as_ref());
        if let Some(parent) = ref_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&ref_path, oid.as_ref().as_bytes())?;
        Ok(())
    }

    /// Write the symbolic HEAD pointing at a branch.
    pub fn init_head(&self, branch: &BranchName) -> Result<()> {
        std::fs::write(self.head_path(), format!("ref: refs/heads/{branch}\n"))?;
        Ok(())
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join("HEAD")
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join("heads")
    }
}
