//! Blob object
//!
//! Blobs store raw file content. They carry no metadata at all; names and
//! modes live in the tree entries pointing at them.
//!
//! On disk: `blob <size>\0<content>`

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// File content addressed by the hash of its serialized form.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Blob {
    content: Bytes,
}

impl Blob {
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

impl Packable for Blob {
    fn serialize(&self) -> crate::errors::Result<Bytes> {
        let mut blob_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), self.content.len());
        blob_bytes.write_all(header.as_bytes())?;
        blob_bytes.write_all(&self.content)?;

        Ok(Bytes::from(blob_bytes))
    }
}

impl Unpackable for Blob {
    fn deserialize(reader: impl BufRead) -> crate::errors::Result<Self> {
        // the envelope header has already been consumed
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        Ok(Self::new(Bytes::from(content)))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_with_envelope() {
        let blob = Blob::new(Bytes::from_static(b"hello world"));
        let bytes = blob.serialize().unwrap();

        assert_eq!(&bytes[..], b"blob 11\0hello world");
    }

    #[test]
    fn identical_content_yields_identical_id() {
        let first = Blob::new(Bytes::from_static(b"test content\n"));
        let second = Blob::new(Bytes::from_static(b"test content\n"));

        assert_eq!(
            first.object_id().unwrap(),
            second.object_id().unwrap()
        );
        // well-known digest of "blob 13\0test content\n"
        assert_eq!(
            first.object_id().unwrap().as_ref(),
            "d670460b4b4aece5915caf5c68d12f560a9fe3e4"
        );
    }

    #[test]
    fn binary_content_survives_a_round_trip() {
        let content = Bytes::from(vec![0u8, 159, 146, 150, 255]);
        let blob = Blob::new(content.clone());

        let serialized = blob.serialize().unwrap();
        let body = &serialized[b"blob 5\0".len()..];
        let decoded = Blob::deserialize(body).unwrap();
        assert_eq!(decoded.content(), &content[..]);
    }
}
