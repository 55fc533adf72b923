//! Index file format
//!
//! The index (staging area) records which files will be part of the next
//! commit. Three on-disk layouts are read; only the simple one is written.
//!
//! ## File Format
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 2, 3 or 4 (4 bytes, big endian)
//!   - Entry count (4 bytes, big endian)
//!
//! Entries (variable length):
//!   - v2/v3: stat block + flags + NUL-terminated path,
//!     zero-padded to 8-byte alignment
//!   - v4: stat block + flags + path delta-encoded against the
//!     previous entry, no padding
//!
//! Extensions (zero or more):
//!   - 4-byte signature + 4-byte size + payload ("TREE" is decoded,
//!     anything else is skipped)
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod cache_tree;
pub mod checksum;
pub mod cursor;
pub mod entry_flags;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "DIRC";

/// Index file format version written on save
pub const VERSION: u32 = 2;

/// Oldest and newest format versions the decoder accepts
pub const SUPPORTED_VERSIONS: std::ops::RangeInclusive<u32> = 2..=4;
