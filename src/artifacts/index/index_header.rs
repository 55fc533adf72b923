use crate::artifacts::index::cursor::ByteCursor;
use crate::artifacts::index::{SIGNATURE, SUPPORTED_VERSIONS};
use crate::artifacts::objects::object::Packable;
use crate::errors::{Error, Result};
use byteorder::WriteBytesExt;
use bytes::Bytes;
use derive_new::new;
use std::io::Write;

#[derive(Debug, Clone, new)]
pub struct IndexHeader {
    pub marker: String,
    pub version: u32,
    pub entries_count: u32,
}

impl IndexHeader {
    pub fn empty() -> Self {
        IndexHeader {
            marker: String::from(SIGNATURE),
            version: crate::artifacts::index::VERSION,
            entries_count: 0,
        }
    }

    pub fn parse(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let marker = cursor.take(4, "index signature")?;
        let marker = std::str::from_utf8(marker)
            .map_err(|_| Error::MalformedIndex("index signature is not valid UTF-8".to_string()))?
            .to_string();
        let version = cursor.read_u32("index version")?;
        let entries_count = cursor.read_u32("index entry count")?;

        Ok(IndexHeader {
            marker,
            version,
            entries_count,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.marker != SIGNATURE {
            return Err(Error::MalformedIndex(format!(
                "bad signature {:?}",
                self.marker
            )));
        }
        if !SUPPORTED_VERSIONS.contains(&self.version) {
            return Err(Error::MalformedIndex(format!(
                "unsupported version {}",
                self.version
            )));
        }

        Ok(())
    }
}

impl Packable for IndexHeader {
    fn serialize(&self) -> Result<Bytes> {
        let mut bytes = Vec::new();
        bytes.write_all(self.marker.as_bytes())?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.version)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.entries_count)?;

        Ok(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serialized_header_parses_back() {
        let header = IndexHeader::new(SIGNATURE.to_string(), 2, 17);
        let bytes = header.serialize().unwrap();
        assert_eq!(bytes.len(), crate::artifacts::index::HEADER_SIZE);

        let mut cursor = ByteCursor::new(&bytes);
        let parsed = IndexHeader::parse(&mut cursor).unwrap();
        parsed.validate().unwrap();
        assert_eq!(parsed.marker, SIGNATURE);
        assert_eq!(parsed.version, 2);
        assert_eq!(parsed.entries_count, 17);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let header = IndexHeader::new("LINK".to_string(), 2, 0);
        assert!(matches!(
            header.validate(),
            Err(Error::MalformedIndex(_))
        ));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let header = IndexHeader::new(SIGNATURE.to_string(), 5, 0);
        assert!(matches!(
            header.validate(),
            Err(Error::MalformedIndex(_))
        ));
    }
}
