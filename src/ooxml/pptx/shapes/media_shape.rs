//! Audio and video clips (`p:pic` with an `a:audioFile` or `a:videoFile`).
use crate::common::xml::XmlElement;
use crate::common::{Error, Result};
use crate::ooxml::pptx::document::PartContext;
use crate::ooxml::pptx::format::MediaType;
use crate::ooxml::pptx::shapes::base::BaseShape;

/// An audio or video clip shown as a preview picture.
#[derive(Debug, Clone)]
pub struct MediaShape {
    base: BaseShape,
    media_type: MediaType,
}

impl MediaShape {
    pub(crate) fn new(base: BaseShape, media_type: MediaType) -> Self {
        Self { base, media_type }
    }

    #[inline]
    pub fn base(&self) -> &BaseShape {
        &self.base
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    fn nv_pr(&self) -> Option<XmlElement> {
        self.base.element().path(&["nvPicPr", "nvPr"])
    }

    /// The part holding the clip.
    ///
    /// Prefers the `p14:media` embed and falls back to the legacy link.
    fn media_part(&self) -> Result<PartContext> {
        let nv_pr = self
            .nv_pr()
            .ok_or_else(|| Error::MalformedInput("no non-visual properties".to_string()))?;
        let r_id = nv_pr
            .first_descendant("media")
            .and_then(|media| media.attr("r:embed"))
            .or_else(|| {
                nv_pr
                    .child(self.media_type.element_local_name())
                    .and_then(|file| file.attr("r:link"))
            })
            .ok_or_else(|| Error::MalformedInput("media has no part reference".to_string()))?;

        let part = self.base.part();
        if part.relationship(&r_id)?.is_external() {
            return Err(Error::UnsupportedOperation(
                "media is linked to an external file".to_string(),
            ));
        }
        part.related_part(&r_id)
    }

    /// Content type of the clip, e.g. `audio/mpeg`.
    pub fn mime(&self) -> Result<String> {
        self.media_part()?.content_type()
    }

    pub fn bytes(&self) -> Result<Vec<u8>> {
        self.media_part()?.blob()
    }
}
