//! Per-presentation index from content hash to media part.
//!
//! The index is filled lazily: the first time media is added to a
//! presentation, every image, audio and video part already in the package is
//! hashed once. After that each add consults the index before creating a part.

use crate::common::Result;
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::part::BlobPart;
use crate::ooxml::pptx::media::stream::{MediaStream, content_hash};
use std::collections::HashMap;

/// Mapping from content hash to an existing media partname.
///
/// Scoped to one open presentation and never shared between documents.
#[derive(Debug, Default)]
pub struct MediaCollection {
    parts: HashMap<String, PackURI>,
    indexed: bool,
}

impl MediaCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Partname of the media part holding content with `hash`, if any.
    pub fn try_get_part(&self, hash: &str) -> Option<&PackURI> {
        self.parts.get(hash)
    }

    /// Record that `partname` holds content with `hash`.
    pub fn set_part(&mut self, hash: impl Into<String>, partname: PackURI) {
        self.parts.insert(hash.into(), partname);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Whether the package has already been scanned for existing media.
    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// Hash every media part already in `package`. Runs once per collection.
    ///
    /// Parts are visited in partname order so that, when a package already
    /// holds duplicates, the lowest-numbered part is the one reused.
    pub fn index_package(&mut self, package: &OpcPackage) {
        if self.indexed {
            return;
        }
        self.indexed = true;

        let mut media: Vec<_> = package
            .iter_parts()
            .filter(|part| is_media_content_type(part.content_type()))
            .collect();
        media.sort_by(|a, b| a.partname().cmp(b.partname()));

        for part in media {
            self.parts
                .entry(content_hash(part.blob()))
                .or_insert_with(|| part.partname().clone());
        }
        tracing::trace!(entries = self.parts.len(), "indexed existing media parts");
    }

    /// Return the part holding `stream`'s content, creating it when missing.
    ///
    /// New parts are named `/ppt/media/{stem}N.{ext}` with the first free `N`.
    pub fn get_or_add_part(
        &mut self,
        package: &mut OpcPackage,
        stream: &MediaStream,
        stem: &str,
    ) -> Result<PackURI> {
        self.index_package(package);

        if let Some(existing) = self.parts.get(stream.hash()) {
            tracing::trace!(part = %existing, "media cache hit");
            return Ok(existing.clone());
        }

        let template = format!("/ppt/media/{}%d.{}", stem, stream.extension());
        let partname = package.next_partname(&template)?;
        package.add_part(Box::new(BlobPart::new(
            partname.clone(),
            stream.mime().to_string(),
            stream.bytes().to_vec(),
        )));
        tracing::trace!(part = %partname, "media cache miss, part created");

        self.parts.insert(stream.hash().to_string(), partname.clone());
        Ok(partname)
    }
}

fn is_media_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
        || content_type.starts_with("audio/")
        || content_type.starts_with("video/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;

    fn png_stream(tag: u8) -> MediaStream {
        MediaStream::new(vec![0x89, b'P', b'N', b'G', tag], ct::PNG, "png")
    }

    #[test]
    fn test_identical_content_shares_one_part() {
        let mut package = OpcPackage::new();
        let mut media = MediaCollection::new();

        let first = media.get_or_add_part(&mut package, &png_stream(1), "image").unwrap();
        let second = media.get_or_add_part(&mut package, &png_stream(1), "image").unwrap();
        let third = media.get_or_add_part(&mut package, &png_stream(2), "image").unwrap();

        assert_eq!(first, second);
        assert_ne!(first, third);
        assert_eq!(first.as_str(), "/ppt/media/image1.png");
        assert_eq!(third.as_str(), "/ppt/media/image2.png");
        assert_eq!(package.part_count(), 2);
        assert_eq!(media.len(), 2);
    }

    #[test]
    fn test_existing_parts_are_indexed_lazily() {
        let mut package = OpcPackage::new();
        let stream = png_stream(7);
        let existing = PackURI::new("/ppt/media/image4.png").unwrap();
        package.add_part(Box::new(BlobPart::new(
            existing.clone(),
            ct::PNG.to_string(),
            stream.bytes().to_vec(),
        )));

        let mut media = MediaCollection::new();
        assert!(!media.is_indexed());
        assert!(media.try_get_part(stream.hash()).is_none());

        let found = media.get_or_add_part(&mut package, &stream, "image").unwrap();
        assert!(media.is_indexed());
        assert_eq!(found, existing);
        assert_eq!(package.part_count(), 1);
    }

    #[test]
    fn test_set_part_is_consulted() {
        let mut media = MediaCollection::new();
        let partname = PackURI::new("/ppt/media/media1.mp3").unwrap();
        media.set_part("abc", partname.clone());
        assert_eq!(media.try_get_part("abc"), Some(&partname));
        assert!(media.try_get_part("abd").is_none());
    }
}
