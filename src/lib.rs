//! grit — the local storage layer of a git-style version control system.
//!
//! The crate covers the hard core every other command is a thin consumer
//! of: the content-addressable object database, the binary staging-area
//! (index) codec, the tree builder that turns flat staged paths into an
//! immutable hash-linked snapshot graph, and commit assembly with the
//! branch-ref update.
//!
//! Everything operates on one explicit repository root, single-threaded,
//! with blocking filesystem I/O and typed errors:
//!
//! ```no_run
//! use grit::areas::repository::Repository;
//! use grit::artifacts::objects::commit::Author;
//! use std::path::Path;
//!
//! # fn main() -> grit::errors::Result<()> {
//! let mut repository = Repository::init(Path::new("/tmp/demo"))?;
//! repository.add(&[Path::new("src")])?;
//! let summary = repository.commit(Author::load_from_env()?, "first commit")?;
//! println!("[{} {}]", summary.branch, summary.oid.to_short_oid());
//! # Ok(())
//! # }
//! ```

pub mod areas;
pub mod artifacts;
pub mod errors;
pub mod operations;
