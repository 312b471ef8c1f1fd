//! Picture (image) shape implementation.
use crate::common::xml::XmlElement;
use crate::common::{Error, Result};
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::pptx::document::PartContext;
use crate::ooxml::pptx::media::MediaStream;
use crate::ooxml::pptx::shapes::base::BaseShape;

/// `a:srcRect` values are in thousandths of a percent.
const CROP_SCALE: f64 = 100_000.0;

/// A picture shape.
///
/// Usually a `p:pic` element; pictures embedded in a graphic frame keep the
/// frame as their shape element and read the image from the nested `p:pic`.
///
/// # Examples
///
/// ```rust,ignore
/// if let Shape::Picture(picture) = shape {
///     let image = picture.image()?;
///     println!("{} ({} bytes)", image.mime()?, image.bytes()?.len());
///     picture.set_transparency(40.0)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Picture {
    base: BaseShape,
    pic: XmlElement,
}

impl Picture {
    pub(crate) fn new(base: BaseShape, pic: XmlElement) -> Self {
        Self { base, pic }
    }

    #[inline]
    pub fn base(&self) -> &BaseShape {
        &self.base
    }

    fn blip_fill(&self) -> Result<XmlElement> {
        self.pic
            .child("blipFill")
            .ok_or_else(|| Error::MalformedInput("no blip fill".to_string()))
    }

    fn blip(&self) -> Result<XmlElement> {
        self.blip_fill()?
            .child("blip")
            .ok_or_else(|| Error::MalformedInput("no blip".to_string()))
    }

    /// The raster image the picture displays.
    pub fn image(&self) -> Result<Image> {
        Ok(Image {
            part: self.base.part().clone(),
            blip: self.blip()?,
        })
    }

    /// Source text of the vector original, for pictures added from SVG.
    pub fn svg_content(&self) -> Result<Option<String>> {
        let Some(svg_blip) = self.blip()?.first_descendant("svgBlip") else {
            return Ok(None);
        };
        let Some(r_id) = svg_blip.attr("r:embed") else {
            return Ok(None);
        };
        let bytes = self.base.part().related_part(&r_id)?.blob()?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Cropping as fractions of the image size; all zero when uncropped.
    pub fn crop(&self) -> Result<CroppingFrame> {
        let Some(src_rect) = self.blip_fill()?.child("srcRect") else {
            return Ok(CroppingFrame::default());
        };
        let side = |attr: &str| {
            src_rect
                .attr_i64(attr)
                .map(|v| v as f64 / CROP_SCALE)
                .unwrap_or(0.0)
        };
        Ok(CroppingFrame {
            left: side("l"),
            right: side("r"),
            top: side("t"),
            bottom: side("b"),
        })
    }

    /// Set the cropping; an all-zero frame removes it.
    pub fn set_crop(&self, frame: CroppingFrame) -> Result<()> {
        let blip_fill = self.blip_fill()?;
        if frame.is_empty() {
            blip_fill.remove_children("srcRect");
            return Ok(());
        }

        let src_rect = match blip_fill.child("srcRect") {
            Some(existing) => existing,
            None => {
                let created = XmlElement::new("a:srcRect");
                match blip_fill.child("blip") {
                    Some(blip) => blip.insert_after(&created)?,
                    None => blip_fill.prepend(&created),
                }
                created
            },
        };

        for (attr, value) in [
            ("l", frame.left),
            ("t", frame.top),
            ("r", frame.right),
            ("b", frame.bottom),
        ] {
            let value = (value * CROP_SCALE).round() as i64;
            if value == 0 {
                src_rect.remove_attr(attr);
            } else {
                src_rect.set_attr(attr, itoa::Buffer::new().format(value));
            }
        }
        Ok(())
    }

    /// Transparency in percent, 0 when the image is fully opaque.
    pub fn transparency(&self) -> Result<f64> {
        let amount = self
            .blip()?
            .child("alphaModFix")
            .and_then(|a| a.attr_i64("amt"));
        Ok(match amount {
            Some(amt) => 100.0 - amt as f64 / 1000.0,
            None => 0.0,
        })
    }

    pub fn set_transparency(&self, percent: f64) -> Result<()> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(Error::MalformedInput(format!(
                "transparency must be within 0..=100, got {}",
                percent
            )));
        }
        let blip = self.blip()?;
        if percent == 0.0 {
            blip.remove_children("alphaModFix");
            return Ok(());
        }

        let alpha = match blip.child("alphaModFix") {
            Some(existing) => existing,
            None => {
                let created = XmlElement::new("a:alphaModFix");
                blip.prepend(&created);
                created
            },
        };
        let amt = ((100.0 - percent) * 1000.0).round() as i64;
        alpha.set_attr("amt", itoa::Buffer::new().format(amt));
        Ok(())
    }

    /// Move the picture behind every other shape of its tree.
    pub fn send_to_back(&self) -> Result<()> {
        let element = self.base.element();
        let tree = element
            .parent()
            .ok_or_else(|| Error::NotFound("picture is not in a shape tree".to_string()))?;
        match tree.child("grpSpPr") {
            Some(grp_sp_pr) => grp_sp_pr.insert_after(element),
            None => {
                tree.prepend(element);
                Ok(())
            },
        }
    }
}

/// The image referenced by a picture's blip.
#[derive(Debug, Clone)]
pub struct Image {
    part: PartContext,
    blip: XmlElement,
}

impl Image {
    fn r_id(&self) -> Result<String> {
        self.blip
            .attr("r:embed")
            .ok_or_else(|| Error::MalformedInput("blip has no embedded image".to_string()))
    }

    fn image_part(&self) -> Result<PartContext> {
        self.part.related_part(&self.r_id()?)
    }

    /// Partname of the image part, e.g. `/ppt/media/image1.png`.
    pub fn partname(&self) -> Result<PackURI> {
        self.part.related_partname(&self.r_id()?)
    }

    pub fn bytes(&self) -> Result<Vec<u8>> {
        self.image_part()?.blob()
    }

    /// Content type of the image part.
    pub fn mime(&self) -> Result<String> {
        self.image_part()?.content_type()
    }

    /// Point the picture at new image content.
    ///
    /// The old relationship is dropped once nothing else on the slide uses it.
    pub fn update(&self, bytes: &[u8]) -> Result<()> {
        let stream = MediaStream::image(bytes.to_vec())?;
        let partname = self.part.add_media(&stream, "image")?;
        let new_r_id = self.part.relate_to(&partname, rt::IMAGE)?;
        let old_r_id = self.blip.attr("r:embed");

        self.blip.set_attr("r:embed", &new_r_id);
        if let Some(old_r_id) = old_r_id.filter(|old| *old != new_r_id) {
            self.part.prune_relationship(&old_r_id)?;
        }
        tracing::debug!(part = %partname, r_id = %new_r_id, "updated picture image");
        Ok(())
    }
}

/// Cropping of each side as a fraction of the image size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CroppingFrame {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl CroppingFrame {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Whether no side is cropped.
    pub fn is_empty(&self) -> bool {
        self.left == 0.0 && self.right == 0.0 && self.top == 0.0 && self.bottom == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::test_support::{png_bytes, slide_part};
    use crate::ooxml::pptx::template;

    fn picture_on_slide() -> (Picture, PartContext) {
        let part = slide_part();
        let stream = MediaStream::image(png_bytes(4, 4, 1)).unwrap();
        let partname = part.add_media(&stream, "image").unwrap();
        let r_id = part.relate_to(&partname, rt::IMAGE).unwrap();

        let pic = template::picture(2, "Picture 2", &r_id, None).unwrap();
        part.shape_tree().unwrap().append(&pic);
        let base = BaseShape::new(part.clone(), pic.clone());
        (Picture::new(base, pic), part)
    }

    #[test]
    fn test_image_reads_related_part() {
        let (picture, _) = picture_on_slide();
        let image = picture.image().unwrap();
        assert_eq!(image.mime().unwrap(), "image/png");
        assert_eq!(image.bytes().unwrap(), png_bytes(4, 4, 1));
        assert_eq!(image.partname().unwrap().as_str(), "/ppt/media/image1.png");
        assert_eq!(picture.svg_content().unwrap(), None);
    }

    #[test]
    fn test_update_replaces_and_prunes() {
        let (picture, part) = picture_on_slide();
        let image = picture.image().unwrap();
        let old_r_id = image.r_id().unwrap();

        image.update(&png_bytes(4, 4, 2)).unwrap();
        assert_eq!(image.bytes().unwrap(), png_bytes(4, 4, 2));
        assert_eq!(image.partname().unwrap().as_str(), "/ppt/media/image2.png");
        assert!(part.relationship(&old_r_id).is_err());
    }

    #[test]
    fn test_crop_round_trip_and_removal() {
        let (picture, _) = picture_on_slide();
        assert!(picture.crop().unwrap().is_empty());

        picture.set_crop(CroppingFrame::new(0.1, 0.0, 0.25, 0.0)).unwrap();
        let blip_fill = picture.blip_fill().unwrap();
        let src_rect = blip_fill.child("srcRect").unwrap();
        assert_eq!(src_rect.attr("l").as_deref(), Some("10000"));
        assert_eq!(src_rect.attr("t").as_deref(), Some("25000"));
        assert!(!src_rect.has_attr("r"));
        let names: Vec<String> = blip_fill.children().iter().map(|c| c.local_name()).collect();
        assert_eq!(names, ["blip", "srcRect", "stretch"]);
        assert_eq!(picture.crop().unwrap(), CroppingFrame::new(0.1, 0.0, 0.25, 0.0));

        picture.set_crop(CroppingFrame::default()).unwrap();
        assert!(blip_fill.child("srcRect").is_none());
    }

    #[test]
    fn test_transparency() {
        let (picture, _) = picture_on_slide();
        assert_eq!(picture.transparency().unwrap(), 0.0);

        picture.set_transparency(30.0).unwrap();
        let blip = picture.blip().unwrap();
        assert_eq!(blip.first_child().unwrap().local_name(), "alphaModFix");
        assert_eq!(blip.child("alphaModFix").unwrap().attr("amt").as_deref(), Some("70000"));
        assert_eq!(picture.transparency().unwrap(), 30.0);

        assert!(picture.set_transparency(120.0).is_err());
        picture.set_transparency(0.0).unwrap();
        assert!(blip.child("alphaModFix").is_none());
    }

    #[test]
    fn test_missing_blip_fill_is_malformed() {
        let part = slide_part();
        let pic = template::parse_fragment(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="3" name="P"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:spPr/></p:pic>"#,
        )
        .unwrap();
        let picture = Picture::new(BaseShape::new(part, pic.clone()), pic);
        assert!(matches!(picture.image(), Err(Error::MalformedInput(m)) if m == "no blip fill"));
    }

    #[test]
    fn test_send_to_back() {
        let (picture, part) = picture_on_slide();
        let tree = part.shape_tree().unwrap();
        let sp = template::autoshape().unwrap();
        // Put the picture last, then send it back
        tree.append(&sp);
        tree.append(picture.base().element());

        picture.send_to_back().unwrap();
        let names: Vec<String> = tree.children().iter().map(|c| c.local_name()).collect();
        assert_eq!(names, ["nvGrpSpPr", "grpSpPr", "pic", "sp"]);
    }
}
