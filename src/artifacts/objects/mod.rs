//! Object types and operations
//!
//! All repository content is stored as objects identified by SHA-1 hashes:
//!
//! - **Blob**: file content (raw bytes)
//! - **Tree**: directory listing (names, modes, and object IDs)
//! - **Commit**: snapshot metadata (author, message, parent, tree)
//!
//! Every object serializes to the same canonical envelope,
//! `<kind> <size>\0<content>`, and its hash over that exact form is both
//! its identity and its storage address.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
