//! Data structures and codecs
//!
//! - `branch`: validated branch names
//! - `database`: tree database entry types
//! - `index`: index (staging area) binary format pieces
//! - `objects`: object types (blob, tree, commit) and their codecs

pub mod branch;
pub mod database;
pub mod index;
pub mod objects;
