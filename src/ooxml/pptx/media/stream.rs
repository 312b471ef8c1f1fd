//! Content-addressed wrapper around media bytes.

use crate::common::{Error, Result};
use crate::ooxml::pptx::format::{ImageFormat, MediaFormat};
use sha2::{Digest, Sha256};
use std::fmt::Write as FmtWrite;

/// Media bytes together with their content hash and MIME type.
///
/// The hash is a lowercase hex SHA-256 digest of the bytes, so two streams
/// with the same content always compare equal by hash.
#[derive(Debug, Clone)]
pub struct MediaStream {
    bytes: Vec<u8>,
    hash: String,
    mime: &'static str,
    extension: &'static str,
}

impl MediaStream {
    /// Wrap bytes with an explicit MIME type and partname extension.
    pub fn new(bytes: Vec<u8>, mime: &'static str, extension: &'static str) -> Self {
        let hash = content_hash(&bytes);
        Self {
            bytes,
            hash,
            mime,
            extension,
        }
    }

    /// Wrap image bytes, detecting the format from the magic number.
    pub fn image(bytes: Vec<u8>) -> Result<Self> {
        let format = ImageFormat::detect_from_bytes(&bytes)
            .ok_or_else(|| Error::DecodeFailure("Unknown image format".to_string()))?;
        Ok(Self::new(bytes, format.mime_type(), format.extension()))
    }

    /// Wrap image bytes of a known format.
    pub fn with_image_format(bytes: Vec<u8>, format: ImageFormat) -> Self {
        Self::new(bytes, format.mime_type(), format.extension())
    }

    /// Wrap an audio or video clip of a known format.
    pub fn with_media_format(bytes: Vec<u8>, format: MediaFormat) -> Self {
        Self::new(bytes, format.mime_type(), format.extension())
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex SHA-256 digest of the bytes.
    #[inline]
    pub fn hash(&self) -> &str {
        &self.hash
    }

    #[inline]
    pub fn mime(&self) -> &'static str {
        self.mime
    }

    #[inline]
    pub fn extension(&self) -> &'static str {
        self.extension
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut sha = Sha256::new();
    sha.update(bytes);
    let digest = sha.finalize();

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        // Writing into a String cannot fail
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable_hex() {
        let hash = content_hash(b"abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(content_hash(b"abc"), hash);
        assert_ne!(content_hash(b"abd"), hash);
    }

    #[test]
    fn test_image_stream_detects_mime() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        let stream = MediaStream::image(png).unwrap();
        assert_eq!(stream.mime(), "image/png");
        assert_eq!(stream.extension(), "png");
        assert_eq!(stream.hash().len(), 64);
    }

    #[test]
    fn test_unknown_image_is_decode_failure() {
        let err = MediaStream::image(b"not an image".to_vec()).unwrap_err();
        assert!(matches!(err, Error::DecodeFailure(_)));
    }
}
