//! Directory-cache ("TREE") index extension.
//!
//! Each record caches the tree object a directory span hashed to, so a
//! writer can skip rebuilding unchanged subtrees. Records form a pre-order
//! flattening of the directory hierarchy:
//!
//! ```text
//! <path>\0<entry-count> <subtree-count>\n[<20-byte oid>]
//! ```
//!
//! A negative entry count marks the record invalidated; no object ID
//! follows it.

use crate::artifacts::index::cursor::ByteCursor;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use derive_new::new;

/// Extension signature for the directory cache
pub const CACHE_TREE_SIGNATURE: &[u8] = b"TREE";

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct CacheTreeEntry {
    /// Directory path component ("" for the root record)
    pub path: String,
    /// Number of index entries covered, negative when invalidated
    pub entry_count: i64,
    /// Number of subtree records that follow
    pub subtree_count: i64,
    /// Cached tree object, absent for invalidated records
    pub oid: Option<ObjectId>,
}

impl CacheTreeEntry {
    pub fn is_invalidated(&self) -> bool {
        self.entry_count < 0
    }

    /// Decode the records packed inside a TREE extension payload.
    pub fn parse_all(data: &[u8]) -> Result<Vec<CacheTreeEntry>> {
        let mut cursor = ByteCursor::new(data);
        let mut entries = Vec::new();

        while cursor.remaining() > 0 {
            let path = cursor.read_until(0, "cache tree path")?;
            let path = std::str::from_utf8(path)
                .map_err(|_| {
                    Error::MalformedIndex("cache tree path is not valid UTF-8".to_string())
                })?
                .to_string();

            let entry_count = ascii_decimal(&mut cursor, b' ', "cache tree entry count")?;
            let subtree_count = ascii_decimal(&mut cursor, b'\n', "cache tree subtree count")?;

            let oid = if entry_count >= 0 {
                let mut oid_bytes = cursor.take(20, "cache tree object id")?;
                Some(ObjectId::read_h40_from(&mut oid_bytes)?)
            } else {
                None
            };

            entries.push(CacheTreeEntry {
                path,
                entry_count,
                subtree_count,
                oid,
            });
        }

        Ok(entries)
    }
}

/// ASCII decimal field terminated by a single delimiter byte.
fn ascii_decimal(cursor: &mut ByteCursor<'_>, terminator: u8, what: &str) -> Result<i64> {
    let raw = cursor.read_until(terminator, what)?;
    std::str::from_utf8(raw)
        .ok()
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or_else(|| Error::MalformedIndex(format!("{what} is not a decimal number")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const OID: &str = "d670460b4b4aece5915caf5c68d12f560a9fe3e4";

    fn raw_record(path: &str, counts: &str, with_oid: bool) -> Vec<u8> {
        let mut record = Vec::new();
        record.extend_from_slice(path.as_bytes());
        record.push(0);
        record.extend_from_slice(counts.as_bytes());
        record.push(b'\n');
        if with_oid {
            let oid = ObjectId::try_parse(OID.to_string()).unwrap();
            oid.write_h40_to(&mut record).unwrap();
        }
        record
    }

    #[test]
    fn decodes_valid_and_invalidated_records() {
        let mut data = raw_record("", "3 1", true);
        data.extend(raw_record("src", "-1 0", false));

        let entries = CacheTreeEntry::parse_all(&data).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].path, "");
        assert_eq!(entries[0].entry_count, 3);
        assert_eq!(entries[0].subtree_count, 1);
        assert!(!entries[0].is_invalidated());
        assert_eq!(entries[0].oid.as_ref().unwrap().as_ref(), OID);

        assert_eq!(entries[1].path, "src");
        assert!(entries[1].is_invalidated());
        assert_eq!(entries[1].oid, None);
    }

    #[test]
    fn missing_oid_is_a_typed_error() {
        let data = raw_record("src", "2 0", false);
        assert!(matches!(
            CacheTreeEntry::parse_all(&data),
            Err(Error::MalformedIndex(_))
        ));
    }

    #[test]
    fn non_decimal_count_is_a_typed_error() {
        let data = raw_record("src", "two 0", false);
        assert!(matches!(
            CacheTreeEntry::parse_all(&data),
            Err(Error::MalformedIndex(_))
        ));
    }
}
