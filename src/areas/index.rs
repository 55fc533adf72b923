//! Staging area (index)
//!
//! The index records which files will make up the next commit, along with
//! the stat metadata change detection runs on. It is read as a whole and
//! rewritten as a whole; there is no incremental patching.
//!
//! ## Data Structures
//!
//! - `entries`: staged paths mapped to their entries, so iteration is
//!   already in the strictly ascending path order the format requires
//! - `children`: directory paths mapped to the entries beneath them, for
//!   discarding conflicting entries on upsert

use crate::artifacts::index::cache_tree::{CACHE_TREE_SIGNATURE, CacheTreeEntry};
use crate::artifacts::index::checksum::{Checksum, verify_buffer};
use crate::artifacts::index::cursor::ByteCursor;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{CHECKSUM_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::io::BufWriter;
use std::path::Path;

/// Staging area, persisted at `.git/index`.
#[derive(Debug)]
pub struct Index {
    /// Path to the index file
    path: Box<Path>,
    /// Staged entries keyed by path
    entries: BTreeMap<Box<Path>, IndexEntry>,
    /// Directory paths mapped to the staged entries beneath them
    children: BTreeMap<Box<Path>, BTreeSet<Box<Path>>>,
    /// Header of the file the entries were loaded from
    header: IndexHeader,
    /// Directory-cache extension records, when the loaded file carried them
    cache_tree: Vec<CacheTreeEntry>,
    /// Whether the in-memory state has diverged from disk
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            header: IndexHeader::empty(),
            cache_tree: Vec::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Version of the file the entries were loaded from (saving always
    /// writes version 2).
    pub fn version(&self) -> u32 {
        self.header.version
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    /// Entries in strictly ascending path order.
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Directory-cache records read from the TREE extension, if any.
    pub fn cache_tree(&self) -> &[CacheTreeEntry] {
        &self.cache_tree
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
        self.cache_tree.clear();
        self.header = IndexHeader::empty();
        self.changed = false;
    }

    /// Load the staging area from disk.
    ///
    /// A missing or empty index file is a valid, empty staging area — a
    /// repository that has never staged anything. A checksum mismatch is
    /// reported but does not abort the load; everything else that is off
    /// about the buffer is a hard [`Error::MalformedIndex`].
    pub fn load(&mut self) -> Result<()> {
        self.clear();

        let content = match std::fs::read(self.path()) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(error.into()),
        };
        if content.is_empty() {
            return Ok(());
        }

        match verify_buffer(&content) {
            Err(Error::IndexChecksumMismatch) => {
                tracing::warn!(path = %self.path().display(), "index checksum mismatch");
            }
            other => other?,
        }

        let payload = &content[..content.len() - CHECKSUM_SIZE];
        let mut cursor = ByteCursor::new(payload);

        let header = IndexHeader::parse(&mut cursor)?;
        header.validate()?;

        // v4 path decoding is stateful: each entry strips and extends the
        // previous entry's path
        let mut previous_path = String::new();
        for _ in 0..header.entries_count {
            let entry = IndexEntry::parse(&mut cursor, header.version, &mut previous_path)?;
            self.store_entry(&entry);
        }

        self.parse_extensions(&mut cursor)?;
        self.header = header;

        Ok(())
    }

    /// Decode the size-prefixed extension blocks between the entries and
    /// the checksum.
    fn parse_extensions(&mut self, cursor: &mut ByteCursor<'_>) -> Result<()> {
        while cursor.remaining() > 0 {
            let signature = cursor.take(4, "extension signature")?;
            let size = cursor.read_u32("extension size")? as usize;
            let data = cursor.take(size, "extension payload")?;

            if signature == CACHE_TREE_SIGNATURE {
                self.cache_tree = CacheTreeEntry::parse_all(data)?;
            } else {
                tracing::debug!(
                    signature = %String::from_utf8_lossy(signature),
                    size,
                    "skipping unrecognized index extension"
                );
            }
        }

        Ok(())
    }

    /// Stage an entry, replacing whatever conflicts with it.
    pub fn add(&mut self, entry: IndexEntry) {
        self.discard_conflicts(&entry);
        self.store_entry(&entry);

        self.header.entries_count = self.entries.len() as u32;
        self.changed = true;
    }

    pub fn remove(&mut self, path: &Path) {
        self.remove_entry(path);
        self.remove_children(path);

        self.header.entries_count = self.entries.len() as u32;
        self.changed = true;
    }

    /// Rewrite the whole index file in the simple version 2 layout, no
    /// extensions.
    ///
    /// The replacement is assembled in a temporary file next to the index
    /// and renamed over it, so a failed write leaves the previous index
    /// untouched. Returns the trailing checksum.
    pub fn write_updates(&mut self) -> Result<ObjectId> {
        let index_dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let temp_file = tempfile::NamedTempFile::new_in(index_dir)?;

        let mut writer = Checksum::new(BufWriter::new(temp_file));

        let header = IndexHeader::new(SIGNATURE.to_string(), VERSION, self.entries.len() as u32);
        writer.write(&header.serialize()?)?;

        for entry in self.entries.values() {
            writer.write(&entry.serialize()?)?;
        }

        let (writer, checksum) = writer.finalize()?;
        let temp_file = writer
            .into_inner()
            .map_err(|error| Error::Io(error.into_error()))?;
        temp_file
            .persist(&self.path)
            .map_err(|error| Error::Io(error.error))?;

        self.header = header;
        // the rewrite never carries extensions forward
        self.cache_tree.clear();
        self.changed = false;

        Ok(checksum)
    }

    /// Remove whatever the new entry collides with: an ancestor directory
    /// staged as a file, or staged entries beneath a path that is becoming
    /// a file.
    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.remove_entry(parent);
        }
        self.remove_children(&entry.name);
    }

    fn store_entry(&mut self, entry: &IndexEntry) {
        let parents: BTreeSet<Box<Path>> = entry
            .parent_dirs()
            .into_iter()
            .map(|parent| parent.to_path_buf().into_boxed_path())
            .collect();

        self.entries
            .insert(entry.name.clone().into_boxed_path(), entry.clone());

        for parent in parents {
            self.children
                .entry(parent)
                .or_default()
                .insert(entry.name.clone().into_boxed_path());
        }
    }

    fn remove_children(&mut self, path: &Path) {
        if let Some(children) = self.children.remove(path) {
            for child in children {
                self.remove_entry(&child);
            }
        }
    }

    fn remove_entry(&mut self, path: &Path) {
        let Some(entry) = self.entries.remove(path) else {
            return;
        };

        for parent in entry.parent_dirs() {
            if let Some(children) = self.children.get_mut(parent) {
                children.remove(path);
                if children.is_empty() {
                    self.children.remove(parent);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
    use crate::artifacts::index::index_entry::EntryMetadata;
    use pretty_assertions::assert_eq;
    use sha1::Digest;
    use std::path::PathBuf;

    fn entry(path: &str) -> IndexEntry {
        let mut hasher = sha1::Sha1::new();
        hasher.update(path);
        let oid = ObjectId::try_parse(format!("{:x}", hasher.finalize())).unwrap();
        let metadata = EntryMetadata {
            mode: EntryMode::File(FileMode::Regular),
            ..Default::default()
        };
        IndexEntry::new(PathBuf::from(path), oid, metadata)
    }

    fn paths(index: &Index) -> Vec<&Path> {
        index.entries().map(|entry| entry.name.as_path()).collect()
    }

    #[test]
    fn entries_stay_sorted_and_unique() {
        let mut index = Index::new(PathBuf::from("index").into_boxed_path());
        index.add(entry("b.txt"));
        index.add(entry("a.txt"));
        index.add(entry("a.txt"));

        assert_eq!(paths(&index), vec![Path::new("a.txt"), Path::new("b.txt")]);
    }

    #[test]
    fn a_file_replacing_a_directory_evicts_its_children() {
        let mut index = Index::new(PathBuf::from("index").into_boxed_path());
        index.add(entry("nested/inner/file.txt"));
        index.add(entry("nested/other.txt"));

        index.add(entry("nested"));

        assert_eq!(paths(&index), vec![Path::new("nested")]);
    }

    #[test]
    fn a_directory_replacing_a_file_evicts_the_file_entry() {
        let mut index = Index::new(PathBuf::from("index").into_boxed_path());
        index.add(entry("nested"));

        index.add(entry("nested/file.txt"));

        assert_eq!(paths(&index), vec![Path::new("nested/file.txt")]);
    }

    #[test]
    fn removing_a_directory_path_removes_the_subtree() {
        let mut index = Index::new(PathBuf::from("index").into_boxed_path());
        index.add(entry("keep.txt"));
        index.add(entry("gone/a.txt"));
        index.add(entry("gone/b/c.txt"));

        index.remove(Path::new("gone"));

        assert_eq!(paths(&index), vec![Path::new("keep.txt")]);
    }
}
