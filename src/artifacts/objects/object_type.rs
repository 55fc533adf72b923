use crate::errors::{Error, Result};
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    /// Parse the `"<kind> <decimal-length>\0"` envelope off the front of an
    /// object stream, returning the kind and the declared body length.
    pub fn parse_header(reader: &mut impl BufRead) -> Result<(ObjectType, usize)> {
        let mut kind = Vec::new();
        reader.read_until(b' ', &mut kind)?;
        if kind.pop() != Some(b' ') {
            return Err(Error::CorruptObject(
                "missing space after object kind".to_string(),
            ));
        }

        let kind = std::str::from_utf8(&kind)
            .map_err(|_| Error::CorruptObject("object kind is not valid UTF-8".to_string()))?;
        let object_type = ObjectType::try_from(kind)?;

        let mut length = Vec::new();
        reader.read_until(b'\0', &mut length)?;
        if length.pop() != Some(b'\0') {
            return Err(Error::CorruptObject(
                "missing NUL after object length".to_string(),
            ));
        }

        let length = std::str::from_utf8(&length)
            .ok()
            .and_then(|raw| raw.parse::<usize>().ok())
            .ok_or_else(|| {
                Error::CorruptObject("object length is not a decimal number".to_string())
            })?;

        Ok((object_type, length))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            other => Err(Error::CorruptObject(format!(
                "unknown object kind {other:?}"
            ))),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
