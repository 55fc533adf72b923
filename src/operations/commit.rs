use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{Error, Result};
use derive_new::new;

/// Outcome of a successful commit.
#[derive(Debug, Clone, new)]
pub struct CommitSummary {
    pub oid: ObjectId,
    pub branch: BranchName,
    /// True when this commit has no parent (the branch was unborn)
    pub is_root: bool,
}

impl Repository {
    /// Snapshot the staging area: build and store the tree graph
    /// bottom-up, assemble the commit on top of the current branch tip,
    /// store it, and advance the branch ref.
    pub fn commit(&mut self, author: Author, message: &str) -> Result<CommitSummary> {
        let branch = self.refs().head_branch().map_err(|error| match error {
            Error::DetachedOrMissingHead => Error::NoBranchHead,
            other => other,
        })?;

        self.index_mut().load()?;

        let root = Tree::build(self.index().entries())?;
        root.traverse(&|tree| self.database().store(tree).map(|_| ()))?;
        let tree_id = root.object_id()?;
        tracing::debug!(tree = %tree_id, entries = self.index().len(), "tree graph stored");

        let parent = self.refs().tip_of(&branch)?;
        let is_root = parent.is_none();

        let commit = Commit::new(parent, tree_id, author, message.trim().to_string());
        let commit_id = self.database().store(&commit)?;
        self.refs().set_tip(&branch, &commit_id)?;

        Ok(CommitSummary::new(commit_id, branch, is_root))
    }
}
