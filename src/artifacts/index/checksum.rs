//! SHA-1 checksum plumbing for the index file.

use crate::artifacts::index::CHECKSUM_SIZE;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use sha1::{Digest, Sha1};
use std::io::Write;

/// Writer that mirrors every byte into a running SHA-1 digest, so the
/// trailing index checksum covers exactly the bytes written before it.
#[derive(Debug)]
pub struct Checksum<W: Write> {
    writer: W,
    digest: Sha1,
}

impl<W: Write> Checksum<W> {
    pub fn new(writer: W) -> Self {
        Checksum {
            writer,
            digest: Sha1::new(),
        }
    }

    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    /// Append the digest of everything written so far and hand back the
    /// underlying writer together with the checksum.
    pub fn finalize(mut self) -> Result<(W, ObjectId)> {
        let checksum = self.digest.finalize();
        self.writer.write_all(checksum.as_slice())?;

        let checksum = ObjectId::try_parse(format!("{checksum:x}"))?;
        Ok((self.writer, checksum))
    }
}

/// Verify the trailing checksum of a whole index buffer.
///
/// The caller decides severity: the index loader downgrades
/// [`Error::IndexChecksumMismatch`] to a warning, matching the on-disk
/// format's soft integrity contract.
pub fn verify_buffer(content: &[u8]) -> Result<()> {
    if content.len() < CHECKSUM_SIZE {
        return Err(Error::MalformedIndex(
            "buffer shorter than its checksum".to_string(),
        ));
    }

    let (payload, stored) = content.split_at(content.len() - CHECKSUM_SIZE);
    let mut digest = Sha1::new();
    digest.update(payload);

    if digest.finalize().as_slice() != stored {
        return Err(Error::IndexChecksumMismatch);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn finalize_appends_a_verifiable_checksum() {
        let mut writer = Checksum::new(Vec::new());
        writer.write(b"DIRC").unwrap();
        writer.write(b"payload").unwrap();

        let (buffer, checksum) = writer.finalize().unwrap();
        assert_eq!(buffer.len(), 4 + 7 + CHECKSUM_SIZE);
        assert_eq!(checksum.as_ref().len(), 40);
        verify_buffer(&buffer).unwrap();
    }

    #[test]
    fn a_flipped_byte_fails_verification() {
        let mut writer = Checksum::new(Vec::new());
        writer.write(b"some index payload").unwrap();
        let (mut buffer, _) = writer.finalize().unwrap();

        buffer[3] ^= 0x40;
        assert!(matches!(
            verify_buffer(&buffer),
            Err(Error::IndexChecksumMismatch)
        ));
    }

    #[test]
    fn a_buffer_without_room_for_a_checksum_is_malformed() {
        assert!(matches!(
            verify_buffer(b"short"),
            Err(Error::MalformedIndex(_))
        ));
    }
}
