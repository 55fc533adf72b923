//! Working-tree reads
//!
//! Everything the storage core needs from the live filesystem: listing the
//! files under a path (the git directory excluded), reading file content,
//! and capturing the stat metadata an index entry records. All access goes
//! through an explicit workspace root; nothing here depends on the process
//! working directory.

use crate::artifacts::index::index_entry::EntryMetadata;
use crate::errors::Result;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 3] = [".git", ".", ".."];

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Expand a workspace-relative path into the files beneath it,
    /// returned relative to the workspace root. A file path expands to
    /// itself; `None` lists the whole tree.
    pub fn list_files(&self, root: Option<&Path>) -> Result<Vec<PathBuf>> {
        let root = match root {
            Some(path) => self.path.join(path),
            None => self.path.to_path_buf(),
        };

        if !root.is_dir() {
            // let a missing path surface as the underlying read error
            return Ok(vec![self.clean_relative(&root).unwrap_or(root)]);
        }

        Ok(WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|walk_entry| walk_entry.ok())
            .filter_map(|walk_entry| self.relative_if_tracked(walk_entry.path()))
            .collect())
    }

    fn is_ignored(path: &Path) -> bool {
        path.components().any(|component| {
            if let std::path::Component::Normal(name) = component {
                IGNORED_PATHS.contains(&name.to_string_lossy().as_ref())
            } else {
                false
            }
        })
    }

    /// Path relative to the workspace root, with `.` components dropped so
    /// staging `.` does not leak them into index paths.
    fn clean_relative(&self, path: &Path) -> Option<PathBuf> {
        let relative = path.strip_prefix(self.path.as_ref()).ok()?;
        Some(
            relative
                .components()
                .filter(|component| !matches!(component, std::path::Component::CurDir))
                .collect(),
        )
    }

    fn relative_if_tracked(&self, path: &Path) -> Option<PathBuf> {
        if path.is_file() && !Self::is_ignored(path) {
            self.clean_relative(path)
        } else {
            None
        }
    }

    /// File content as raw bytes; a symlink reads as its target path.
    pub fn read_file(&self, file_path: &Path) -> Result<Bytes> {
        let path = self.path.join(file_path);

        let metadata = std::fs::symlink_metadata(&path)?;
        if metadata.file_type().is_symlink() {
            let target = std::fs::read_link(&path)?;
            return Ok(Bytes::from(target.into_os_string().into_encoded_bytes()));
        }

        Ok(std::fs::read(path)?.into())
    }

    /// Stat metadata for an index entry, from `lstat` so symlinks are
    /// recorded as links rather than their targets.
    pub fn stat_file(&self, file_path: &Path) -> Result<EntryMetadata> {
        let path = self.path.join(file_path);
        let metadata = std::fs::symlink_metadata(&path)?;

        (path.as_path(), metadata).try_into()
    }
}
