//! Object identifier (SHA-1 hash)
//!
//! Object IDs are 40-character lowercase hexadecimal strings representing
//! SHA-1 hashes. They uniquely identify all objects (blobs, trees, commits)
//! and double as the storage address:
//! `objects/<first-2-chars>/<remaining-38-chars>`.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::errors::{Error, Result};
use std::io;
use std::path::PathBuf;

/// A 40-character hexadecimal SHA-1 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string.
    ///
    /// Accepts exactly 40 hex characters; mixed case is normalized to the
    /// canonical lowercase form.
    pub fn try_parse(id: String) -> Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(Error::InvalidObjectId(format!(
                "expected {OBJECT_ID_LENGTH} hex characters, got {}",
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidObjectId(id));
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Write the object ID in binary form (20 bytes).
    ///
    /// Used when serializing tree objects and index entries.
    pub fn write_h40_to<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        for i in (0..OBJECT_ID_LENGTH).step_by(2) {
            let byte = u8::from_str_radix(&self.0[i..i + 2], 16)
                .map_err(|_| Error::InvalidObjectId(self.0.clone()))?;
            writer.write_all(&[byte])?;
        }

        Ok(())
    }

    /// Read an object ID from binary form (20 bytes).
    pub fn read_h40_from<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0u8; OBJECT_ID_LENGTH / 2];
        reader.read_exact(&mut bytes)?;

        let mut hex40 = String::with_capacity(OBJECT_ID_LENGTH);
        for byte in bytes {
            hex40.push_str(&format!("{byte:02x}"));
        }

        Self::try_parse(hex40)
    }

    /// Storage path for the object: `XX/YYYY…` with the first two hex
    /// characters as the fan-out directory.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters, the conventional abbreviation.
    pub fn to_short_oid(&self) -> &str {
        &self.0[..7]
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
