//! Format types for PPTX media parts.
//!
//! Formats are detected from magic numbers first; the MIME type and the
//! partname extension of a new media part both come from the detected format.

use memchr::memmem;

/// Image format types supported by PPTX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    /// Scalable vector graphics, stored next to a raster preview
    Svg,
    /// Enhanced metafile
    Emf,
    /// Windows metafile
    Wmf,
}

impl ImageFormat {
    /// Get the MIME type for this image format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Svg => "image/svg+xml",
            Self::Emf => "image/x-emf",
            Self::Wmf => "image/x-wmf",
        }
    }

    /// Get the file extension for this image format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Svg => "svg",
            Self::Emf => "emf",
            Self::Wmf => "wmf",
        }
    }

    /// Map a part content type back onto a format.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/bmp" => Some(Self::Bmp),
            "image/tiff" => Some(Self::Tiff),
            "image/svg+xml" => Some(Self::Svg),
            "image/x-emf" => Some(Self::Emf),
            "image/x-wmf" => Some(Self::Wmf),
            _ => None,
        }
    }

    /// Detect image format from bytes (magic number detection).
    ///
    /// SVG has no magic number; a `<svg` tag within the first kilobyte is
    /// accepted.
    pub fn detect_from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // GIF: 47 49 46 38 (GIF8)
        if bytes.starts_with(&[0x47, 0x49, 0x46, 0x38]) {
            return Some(Self::Gif);
        }

        // BMP: 42 4D (BM)
        if bytes.starts_with(&[0x42, 0x4D]) {
            return Some(Self::Bmp);
        }

        // TIFF: 49 49 2A 00 (little-endian) or 4D 4D 00 2A (big-endian)
        if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return Some(Self::Tiff);
        }

        // EMF: record type 1 followed by " EMF" signature at offset 40
        if bytes.len() >= 44 && bytes.starts_with(&[0x01, 0x00, 0x00, 0x00]) && &bytes[40..44] == b" EMF"
        {
            return Some(Self::Emf);
        }

        // Placeable WMF: D7 CD C6 9A
        if bytes.starts_with(&[0xD7, 0xCD, 0xC6, 0x9A]) {
            return Some(Self::Wmf);
        }

        let head = &bytes[..bytes.len().min(1024)];
        if memmem::find(head, b"<svg").is_some() {
            return Some(Self::Svg);
        }

        None
    }
}

/// Media type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// Audio clip
    Audio,
    /// Video clip
    Video,
}

impl MediaType {
    /// Get the MIME type prefix for this media type.
    pub fn mime_prefix(&self) -> &'static str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Video => "video",
        }
    }

    /// Get the relationship type used by `a:audioFile`/`a:videoFile`.
    pub fn relationship_type(&self) -> &'static str {
        use crate::ooxml::opc::constants::relationship_type as rt;
        match self {
            MediaType::Audio => rt::AUDIO,
            MediaType::Video => rt::VIDEO,
        }
    }

    /// Local name of the element that marks a picture as this media type.
    pub(crate) fn element_local_name(&self) -> &'static str {
        match self {
            MediaType::Audio => "audioFile",
            MediaType::Video => "videoFile",
        }
    }
}

/// Audio/Video format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    /// MP3 audio
    Mp3,
    /// WAV audio
    Wav,
    /// MP4 video
    Mp4,
}

impl MediaFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(MediaFormat::Mp3),
            "wav" => Some(MediaFormat::Wav),
            "mp4" => Some(MediaFormat::Mp4),
            _ => None,
        }
    }

    /// Map a part content type back onto a format.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "audio/mpeg" | "audio/mp3" => Some(MediaFormat::Mp3),
            "audio/wav" | "audio/x-wav" => Some(MediaFormat::Wav),
            "video/mp4" => Some(MediaFormat::Mp4),
            _ => None,
        }
    }

    /// Detect format from file bytes (magic number detection).
    pub fn detect_from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // ID3 tag (MP3)
        if data.starts_with(b"ID3") {
            return Some(MediaFormat::Mp3);
        }

        // MP3 frame sync
        if data[0] == 0xFF && (data[1] & 0xE0) == 0xE0 {
            return Some(MediaFormat::Mp3);
        }

        // RIFF/WAV
        if data.starts_with(b"RIFF") && &data[8..12] == b"WAVE" {
            return Some(MediaFormat::Wav);
        }

        // MP4 (ftyp box)
        if &data[4..8] == b"ftyp" {
            return Some(MediaFormat::Mp4);
        }

        None
    }

    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "audio/mpeg",
            MediaFormat::Wav => "audio/wav",
            MediaFormat::Mp4 => "video/mp4",
        }
    }

    /// Get the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "mp3",
            MediaFormat::Wav => "wav",
            MediaFormat::Mp4 => "mp4",
        }
    }

    /// Get the media type (audio or video) for this format.
    pub fn media_type(&self) -> MediaType {
        match self {
            MediaFormat::Mp3 | MediaFormat::Wav => MediaType::Audio,
            MediaFormat::Mp4 => MediaType::Video,
        }
    }
}
