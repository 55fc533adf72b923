//! Content-addressed object database
//!
//! Objects live one per file under `objects/<first-hex-byte>/<rest>`,
//! zlib-deflated. The digest of the canonical serialized form is both the
//! identity and the address, so writes are idempotent and nothing is ever
//! mutated or deleted.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::Path;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Write an object unless its address is already occupied.
    ///
    /// Identical content hashes to an identical address, so a repeated
    /// store is a no-op after the first physical write.
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        if object_path.exists() {
            tracing::debug!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        self.write_object(&object_path, object.serialize()?)?;
        Ok(object_id)
    }

    /// Raw object content (header included) at the given id.
    pub fn load(&self, object_id: &ObjectId) -> Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        let compressed = std::fs::read(&object_path).map_err(|error| {
            if error.kind() == std::io::ErrorKind::NotFound {
                Error::ObjectNotFound(object_id.clone())
            } else {
                Error::Io(error)
            }
        })?;

        Self::decompress(&compressed, object_id)
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> Result<ObjectBox> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(object_reader)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(object_reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(
                object_reader,
            )?))),
        }
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> Result<Option<Blob>> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(Some(Blob::deserialize(object_reader)?)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> Result<Option<Tree>> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Tree => Ok(Some(Tree::deserialize(object_reader)?)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> Result<Option<Commit>> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Commit => Ok(Some(Commit::deserialize(object_reader)?)),
            _ => Ok(None),
        }
    }

    /// Kind of the object stored at the given id, without parsing the body.
    pub fn object_type(&self, object_id: &ObjectId) -> Result<ObjectType> {
        let (object_type, _) = self.parse_object_as_bytes(object_id)?;
        Ok(object_type)
    }

    fn parse_object_as_bytes(&self, object_id: &ObjectId) -> Result<(ObjectType, impl BufRead)> {
        let content = self.load(object_id)?;
        let mut reader = Cursor::new(content);

        let (object_type, declared_length) = ObjectType::parse_header(&mut reader)?;

        let body_length = reader.get_ref().len() - reader.position() as usize;
        if declared_length != body_length {
            return Err(Error::CorruptObject(format!(
                "object {object_id} declares {declared_length} bytes but carries {body_length}"
            )));
        }

        Ok((object_type, reader))
    }

    /// Deflate and write through a temporary file in the fan-out directory,
    /// renamed into place once complete.
    fn write_object(&self, object_path: &Path, content: Bytes) -> Result<()> {
        let object_dir = object_path.parent().unwrap_or(self.path.as_ref());
        std::fs::create_dir_all(object_dir)?;

        let compressed = Self::compress(&content)?;

        let mut temp_file = tempfile::NamedTempFile::new_in(object_dir)?;
        temp_file.write_all(&compressed)?;
        temp_file
            .persist(object_path)
            .map_err(|error| Error::Io(error.error))?;

        tracing::debug!(path = %object_path.display(), bytes = compressed.len(), "object written");
        Ok(())
    }

    fn compress(data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data)?;

        Ok(encoder.finish()?)
    }

    fn decompress(data: &[u8], object_id: &ObjectId) -> Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut content = Vec::new();
        decoder.read_to_end(&mut content).map_err(|error| {
            Error::CorruptObject(format!("object {object_id} has a bad deflate stream: {error}"))
        })?;

        Ok(content.into())
    }
}
