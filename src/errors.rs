//! Typed errors for the storage core.
//!
//! Every fallible operation surfaces one of these variants to its immediate
//! caller; nothing is retried internally and nothing aborts the process.
//! All operations are local filesystem calls, so callers own any retry
//! policy they want on top of [`Error::Io`].

use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The expected repository markers are absent under the given root.
    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),

    /// No object file exists at the digest's address.
    #[error("object {0} not found in the database")]
    ObjectNotFound(ObjectId),

    /// The object file exists but its deflate stream or
    /// `"<kind> <length>\0"` header cannot be parsed.
    #[error("corrupt object: {0}")]
    CorruptObject(String),

    /// The index buffer is truncated, carries a bad signature or version,
    /// or a variable-length field under- or overflows while scanning.
    #[error("malformed index: {0}")]
    MalformedIndex(String),

    /// The trailing index checksum does not cover the preceding bytes.
    ///
    /// The index loader downgrades this to a warning (the on-disk format
    /// treats the checksum as a soft integrity check); it is only surfaced
    /// as an error by the verification seam itself.
    #[error("index checksum does not match value stored on disk")]
    IndexChecksumMismatch,

    /// HEAD is absent or holds a raw digest instead of a symbolic ref.
    #[error("HEAD is missing or does not point at a branch")]
    DetachedOrMissingHead,

    /// A commit was requested while no branch is checked out.
    #[error("cannot commit: no branch is currently checked out")]
    NoBranchHead,

    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
