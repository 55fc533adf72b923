//! Repository handle
//!
//! Wires the areas together around one explicit root: the working tree at
//! `path` and the storage under `path/.git`. Components never consult the
//! process working directory; every path flows from the root given here.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::errors::{Error, Result};
use std::path::Path;

pub(crate) const GIT_DIR: &str = ".git";

pub struct Repository {
    path: Box<Path>,
    database: Database,
    index: Index,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Open an existing repository rooted at `path`.
    ///
    /// Fails with [`Error::NotARepository`] when the git directory marker
    /// is absent.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.join(GIT_DIR).is_dir() {
            return Err(Error::NotARepository(path.to_path_buf()));
        }

        Ok(Self::attach(path))
    }

    /// Bind the component set to a root without checking for the marker;
    /// `init` uses this before the layout exists.
    pub(crate) fn attach(path: &Path) -> Self {
        let git_path = path.join(GIT_DIR);

        Repository {
            database: Database::new(git_path.join("objects").into_boxed_path()),
            index: Index::new(git_path.join("index").into_boxed_path()),
            workspace: Workspace::new(path.to_path_buf().into_boxed_path()),
            refs: Refs::new(git_path.into_boxed_path()),
            path: path.to_path_buf().into_boxed_path(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut Index {
        &mut self.index
    }
}
