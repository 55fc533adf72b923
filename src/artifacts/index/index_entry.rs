//! Index entry representation
//!
//! Each entry records one staged path: the blob's object ID plus the stat
//! metadata (mode, size, timestamps) that lets change detection skip
//! re-reading file content.
//!
//! ## Entry Format
//!
//! In versions 2 and 3 an entry is a fixed 62-byte block (stat fields,
//! object ID, flags), an optional extended-flags word, the NUL-terminated
//! path, and zero padding to an 8-byte boundary. Version 4 drops the
//! padding and delta-encodes the path against the previous entry: a
//! variable-length strip count followed by a NUL-terminated suffix. That
//! decoding is inherently sequential, so the previous path is threaded
//! through the loop as explicit decoder state.

use crate::artifacts::index::cursor::ByteCursor;
use crate::artifacts::index::entry_flags::{EntryFlags, ExtendedFlags, MAX_NAME_LENGTH};
use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use byteorder::WriteBytesExt;
use bytes::Bytes;
use is_executable::IsExecutable;
use std::fs::Metadata;
use std::io::Write;
use std::os::unix::prelude::MetadataExt;
use std::path::{Path, PathBuf};

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// One staged path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexEntry {
    /// Path relative to the repository root
    pub name: PathBuf,
    /// Object ID of the staged blob
    pub oid: ObjectId,
    /// Stat metadata captured when the path was staged
    pub metadata: EntryMetadata,
    /// First flags word (assume-valid, extended, stage, name length)
    pub flags: EntryFlags,
    /// Second flags word, present only when the extended bit is set
    pub extended_flags: Option<ExtendedFlags>,
}

impl IndexEntry {
    pub fn new(name: PathBuf, oid: ObjectId, metadata: EntryMetadata) -> Self {
        let flags = EntryFlags::default().with_name_length(name.as_os_str().len());
        IndexEntry {
            name,
            oid,
            metadata,
            flags,
            extended_flags: None,
        }
    }

    pub fn basename(&self) -> Result<&str> {
        self.name
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                Error::MalformedIndex(format!("entry path {:?} has no file name", self.name))
            })
    }

    /// Ancestor directories of the entry, outermost first.
    pub fn parent_dirs(&self) -> Vec<&Path> {
        let mut dirs: Vec<&Path> =
            std::iter::successors(self.name.parent(), |parent| parent.parent())
                .filter(|parent| !parent.as_os_str().is_empty())
                .collect();
        dirs.reverse();
        dirs
    }

    /// Decode one on-disk entry.
    ///
    /// `previous_path` carries the delta-decoding state across a version 4
    /// entry stream; versions 2 and 3 ignore it.
    pub fn parse(
        cursor: &mut ByteCursor<'_>,
        version: u32,
        previous_path: &mut String,
    ) -> Result<Self> {
        let entry_start = cursor.position();

        let ctime = i64::from(cursor.read_u32("ctime")?);
        let ctime_nsec = i64::from(cursor.read_u32("ctime nanoseconds")?);
        let mtime = i64::from(cursor.read_u32("mtime")?);
        let mtime_nsec = i64::from(cursor.read_u32("mtime nanoseconds")?);
        let dev = u64::from(cursor.read_u32("device")?);
        let ino = u64::from(cursor.read_u32("inode")?);
        let mode_word = cursor.read_u32("mode")?;
        let mode = EntryMode::from_u32(mode_word).ok_or_else(|| {
            Error::MalformedIndex(format!("unsupported entry mode {mode_word:o}"))
        })?;
        let uid = cursor.read_u32("uid")?;
        let gid = cursor.read_u32("gid")?;
        let size = u64::from(cursor.read_u32("file size")?);

        let mut oid_bytes = cursor.take(20, "object id")?;
        let oid = ObjectId::read_h40_from(&mut oid_bytes)?;

        let flags = EntryFlags::from_bits_retain(cursor.read_u16("flags")?);
        let extended_flags = if flags.contains(EntryFlags::EXTENDED) {
            if version < 3 {
                return Err(Error::MalformedIndex(
                    "extended flag set in a version 2 index".to_string(),
                ));
            }
            Some(ExtendedFlags::from_bits_retain(
                cursor.read_u16("extended flags")?,
            ))
        } else {
            None
        };

        let name = match version {
            2 | 3 => {
                let raw = Self::parse_padded_name(cursor, &flags, entry_start)?;
                String::from_utf8(raw).map_err(|_| {
                    Error::MalformedIndex("entry path is not valid UTF-8".to_string())
                })?
            }
            4 => Self::parse_delta_name(cursor, previous_path)?,
            other => {
                return Err(Error::MalformedIndex(format!(
                    "unsupported version {other}"
                )));
            }
        };

        if version == 4 {
            *previous_path = name.clone();
        }

        Ok(IndexEntry {
            name: PathBuf::from(name),
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
            },
            flags,
            extended_flags,
        })
    }

    /// v2/v3 path: declared length when it fits the 12-bit field, NUL scan
    /// otherwise, then padding to an 8-byte multiple from the entry start.
    fn parse_padded_name(
        cursor: &mut ByteCursor<'_>,
        flags: &EntryFlags,
        entry_start: usize,
    ) -> Result<Vec<u8>> {
        let declared = flags.name_length();
        let raw = if declared < MAX_NAME_LENGTH {
            let raw = cursor.take(declared, "entry path")?;
            if cursor.read_byte("path terminator")? != 0 {
                return Err(Error::MalformedIndex(
                    "entry path is not NUL-terminated".to_string(),
                ));
            }
            raw
        } else {
            cursor.read_until(0, "entry path")?
        };

        let raw = raw.to_vec();
        cursor.skip_padding(entry_start, ENTRY_BLOCK)?;
        Ok(raw)
    }

    /// v4 path: strip count against the previous path, then a suffix.
    fn parse_delta_name(cursor: &mut ByteCursor<'_>, previous_path: &str) -> Result<String> {
        let strip = cursor.read_varint("path strip count")?;
        let strip = usize::try_from(strip).ok();
        let keep = strip
            .and_then(|strip| previous_path.len().checked_sub(strip))
            .ok_or_else(|| {
                Error::MalformedIndex(format!(
                    "path strip count exceeds previous path length {}",
                    previous_path.len()
                ))
            })?;

        let suffix = cursor.read_until(0, "entry path suffix")?;
        let mut name = Vec::with_capacity(keep + suffix.len());
        name.extend_from_slice(&previous_path.as_bytes()[..keep]);
        name.extend_from_slice(suffix);

        String::from_utf8(name)
            .map_err(|_| Error::MalformedIndex("entry path is not valid UTF-8".to_string()))
    }
}

impl Packable for IndexEntry {
    /// Serialize in the version 2 layout: the only format written on save.
    /// The extended word is never emitted, so the extended bit is cleared.
    fn serialize(&self) -> Result<Bytes> {
        let name = self.name.to_str().ok_or_else(|| {
            Error::MalformedIndex(format!("entry path {:?} is not valid UTF-8", self.name))
        })?;

        let mut bytes = Vec::new();
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime as u32)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime_nsec as u32)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime as u32)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime_nsec as u32)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.dev as u32)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ino as u32)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mode.as_u32())?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.uid)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.gid)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.size as u32)?;
        self.oid.write_h40_to(&mut bytes)?;

        let flags = self
            .flags
            .difference(EntryFlags::EXTENDED)
            .with_name_length(name.len());
        bytes.write_u16::<byteorder::NetworkEndian>(flags.bits())?;
        bytes.write_all(name.as_bytes())?;

        // at least one NUL terminator, then pad to the 8-byte block
        bytes.push(0);
        while bytes.len() % ENTRY_BLOCK != 0 {
            bytes.push(0);
        }

        Ok(Bytes::from(bytes))
    }
}

/// Stat metadata stored alongside each staged path.
///
/// Comparing these fields against a fresh `lstat` is how change detection
/// avoids re-hashing file content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Status-change time (seconds since Unix epoch)
    pub ctime: i64,
    /// Status-change time nanoseconds
    pub ctime_nsec: i64,
    /// Content-modification time (seconds since Unix epoch)
    pub mtime: i64,
    /// Content-modification time nanoseconds
    pub mtime_nsec: i64,
    /// Device ID
    pub dev: u64,
    /// Inode number
    pub ino: u64,
    /// Typed file mode
    pub mode: EntryMode,
    /// User ID of owner
    pub uid: u32,
    /// Group ID of owner
    pub gid: u32,
    /// File size in bytes
    pub size: u64,
}

impl TryFrom<(&Path, Metadata)> for EntryMetadata {
    type Error = Error;

    /// Build entry metadata from an `lstat` result. `file_path` must be
    /// absolute; the executable probe touches the filesystem again.
    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self> {
        let mode = if metadata.is_dir() {
            EntryMode::Directory
        } else if metadata.file_type().is_symlink() {
            EntryMode::File(FileMode::Symlink)
        } else if file_path.is_executable() {
            EntryMode::File(FileMode::Executable)
        } else {
            EntryMode::File(FileMode::Regular)
        };

        Ok(Self {
            ctime: metadata.ctime(),
            ctime_nsec: metadata.ctime_nsec(),
            mtime: metadata.mtime(),
            mtime_nsec: metadata.mtime_nsec(),
            dev: metadata.dev(),
            ino: metadata.ino(),
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size(),
        })
    }
}
