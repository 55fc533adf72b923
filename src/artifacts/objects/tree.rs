//! Tree object
//!
//! Trees are directory snapshots: an ordered list of (mode, name, object)
//! entries covering the files and subdirectories at one level.
//!
//! On disk: `tree <size>\0` followed by `<octal-mode> <name>\0<20-byte-oid>`
//! per entry, canonically sorted with directory names compared as if they
//! ended in `/`.
//!
//! ## Tree Building
//!
//! [`Tree::build`] turns the flat, path-sorted staging area into an
//! explicit tree of directory nodes of arbitrary depth; every node owns
//! its direct file entries and its child directories. [`Tree::traverse`]
//! then visits the nodes post-order so each child tree can be persisted
//! before the parent that references it.

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;

/// Node owned by a tree while it is being assembled from the index.
#[derive(Debug, Clone)]
enum TreeNode {
    /// File entry pointing at a staged blob
    File { mode: EntryMode, oid: ObjectId },
    /// Child directory
    Directory(Tree),
}

impl TreeNode {
    fn mode(&self) -> EntryMode {
        match self {
            TreeNode::File { mode, .. } => *mode,
            TreeNode::Directory(_) => EntryMode::Directory,
        }
    }

    fn oid(&self) -> Result<ObjectId> {
        match self {
            TreeNode::File { oid, .. } => Ok(oid.clone()),
            TreeNode::Directory(tree) => tree.object_id(),
        }
    }
}

/// Directory snapshot, usable in two directions.
///
/// `writeable_entries` holds the nodes assembled from the index on the way
/// into the database; `readable_entries` holds what [`Tree::deserialize`]
/// read back out. Directory keys on the writeable side carry a trailing
/// `/`, so plain map order is already the canonical object order.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    readable_entries: BTreeMap<String, DatabaseEntry>,
    writeable_entries: BTreeMap<String, TreeNode>,
}

impl Tree {
    /// Assemble the directory hierarchy for a flat set of staged entries.
    ///
    /// Works for any nesting depth: each path component on the way to an
    /// entry gets its own directory node, created on first sight.
    pub fn build<'e>(entries: impl Iterator<Item = &'e IndexEntry>) -> Result<Self> {
        let mut root = Self::default();

        for entry in entries {
            let parents = entry.parent_dirs();
            root.add_entry(&parents, entry)?;
        }

        Ok(root)
    }

    fn add_entry(&mut self, parents: &[&Path], entry: &IndexEntry) -> Result<()> {
        if parents.is_empty() {
            let name = entry.basename()?.to_string();
            if self.writeable_entries.contains_key(&format!("{name}/")) {
                return Err(Error::MalformedIndex(format!(
                    "{name} is staged as both a file and a directory"
                )));
            }
            self.writeable_entries.insert(
                name,
                TreeNode::File {
                    mode: entry.metadata.mode,
                    oid: entry.oid.clone(),
                },
            );
            return Ok(());
        }

        let dir_name = parents[0]
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                Error::MalformedIndex(format!("invalid directory name in {:?}", parents[0]))
            })?;
        if self.writeable_entries.contains_key(dir_name) {
            return Err(Error::MalformedIndex(format!(
                "{dir_name} is staged as both a file and a directory"
            )));
        }

        let node = self
            .writeable_entries
            .entry(format!("{dir_name}/"))
            .or_insert_with(|| TreeNode::Directory(Tree::default()));
        match node {
            TreeNode::Directory(tree) => tree.add_entry(&parents[1..], entry),
            TreeNode::File { .. } => unreachable!("file nodes are never keyed with a trailing /"),
        }
    }

    /// Visit every directory node post-order (children before parents).
    ///
    /// Storing each visited tree persists the graph bottom-up: by the time
    /// a parent is serialized, the ids of its child trees are final.
    pub fn traverse<F>(&self, func: &F) -> Result<()>
    where
        F: Fn(&Tree) -> Result<()>,
    {
        for node in self.writeable_entries.values() {
            if let TreeNode::Directory(tree) = node {
                tree.traverse(func)?;
            }
        }
        func(self)
    }

    /// Entries read back from the database.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &DatabaseEntry)> {
        self.readable_entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = (String, DatabaseEntry)> {
        self.readable_entries.into_iter()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Result<Bytes> {
        let mut content_bytes = Vec::new();
        for (name, node) in &self.writeable_entries {
            let name = name.trim_end_matches('/');

            let header = format!("{:o} {}", node.mode().as_u32(), name);
            content_bytes.write_all(header.as_bytes())?;
            content_bytes.push(0);
            node.oid()?.write_h40_to(&mut content_bytes)?;
        }

        let mut tree_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        tree_bytes.write_all(header.as_bytes())?;
        tree_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(tree_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> Result<Self> {
        let mut entries = BTreeMap::new();
        let mut reader = reader;

        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let read = reader.read_until(b' ', &mut mode_bytes)?;
            if read == 0 {
                break; // clean EOF, no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(Error::CorruptObject(
                    "unexpected EOF in tree entry mode".to_string(),
                ));
            }

            let mode_str = std::str::from_utf8(&mode_bytes)
                .map_err(|_| Error::CorruptObject("tree entry mode is not UTF-8".to_string()))?;
            let mode = EntryMode::from_octal_str(mode_str).ok_or_else(|| {
                Error::CorruptObject(format!("unknown tree entry mode {mode_str:?}"))
            })?;

            name_bytes.clear();
            let read = reader.read_until(b'\0', &mut name_bytes)?;
            if read == 0 || name_bytes.pop() != Some(b'\0') {
                return Err(Error::CorruptObject(
                    "unexpected EOF in tree entry name".to_string(),
                ));
            }
            let name = std::str::from_utf8(&name_bytes)
                .map_err(|_| Error::CorruptObject("tree entry name is not UTF-8".to_string()))?
                .to_owned();

            let oid = ObjectId::read_h40_from(&mut reader)
                .map_err(|_| Error::CorruptObject("unexpected EOF in tree entry id".to_string()))?;

            entries.insert(name, DatabaseEntry::new(oid, mode));
        }

        Ok(Tree {
            readable_entries: entries,
            writeable_entries: Default::default(),
        })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}
