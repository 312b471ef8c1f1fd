//! Copying a shape into a shape tree, possibly of another presentation.
//!
//! The element is deep-cloned and every relationship it refers to is
//! re-created from the target part: external targets are linked again,
//! images and clips are copied through the target's media collection, charts
//! and embeddings get their own copy, and other parts of the same
//! presentation are simply related to again. Whole slides are copied with the
//! same rewrite.
use crate::common::xml::XmlElement;
use crate::common::{Error, Result};
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::part::PartFactory;
use crate::ooxml::opc::rel::Relationship;
use crate::ooxml::pptx::document::PartContext;
use crate::ooxml::pptx::format::{ImageFormat, MediaFormat};
use crate::ooxml::pptx::media::MediaStream;
use crate::ooxml::pptx::shapes::Shape;
use crate::ooxml::pptx::shapes::base::BaseShape;
use crate::ooxml::pptx::shapes::naming::{self, NameMatcher};

/// Attributes holding relationship ids.
const REL_ATTRS: &[&str] = &["r:embed", "r:link", "r:id"];

/// Relationship types whose target bytes are copied rather than shared.
const COPIED_RELTYPES: &[&str] = &[
    rt::IMAGE,
    rt::MEDIA,
    rt::AUDIO,
    rt::VIDEO,
    rt::OLE_OBJECT,
    rt::CHART,
];

/// How many relationships deep a copied part drags its own targets along.
const MAX_PART_DEPTH: usize = 4;

/// Append a copy of `source` to `tree`, owned by `target`.
///
/// The copy gets the next free id of `tree` and the source's name, numbered
/// past any existing name it would collide with.
pub(crate) fn copy_shape(source: &Shape, target: &PartContext, tree: &XmlElement) -> Result<XmlElement> {
    if !source.is_copyable() {
        return Err(Error::UnsupportedOperation(format!(
            "{:?} shapes cannot be copied",
            source.kind()
        )));
    }

    let source_part = source.base().part();
    let clone = source.element().deep_clone();
    rewrite_references(&clone, source_part, target)?;

    let matcher = NameMatcher::new(target.options().name_match_budget);
    let name = matcher.disambiguate(&source.name(), &naming::names(tree))?;
    let id = naming::next_id(tree);

    let copy = BaseShape::new(target.clone(), clone.clone());
    copy.set_id(id)?;
    copy.set_name(&name)?;
    tree.append(&clone);

    tracing::debug!(id, name = %name, from = %source_part.partname(), to = %target.partname(), "copied shape");
    Ok(clone)
}

/// Re-create every relationship `root` and its descendants refer to from
/// `target`, rewriting the ids in place.
///
/// `root` must be a detached copy of XML owned by `source`.
pub(crate) fn rewrite_references(root: &XmlElement, source: &PartContext, target: &PartContext) -> Result<()> {
    for element in std::iter::once(root.clone()).chain(root.descendants()) {
        for attr in REL_ATTRS {
            let Some(r_id) = element.attr(attr).filter(|r| !r.is_empty()) else {
                continue;
            };
            match rewrite_relationship(source, target, &r_id)? {
                Some(new_r_id) => element.set_attr(attr, &new_r_id),
                None => {
                    element.remove_attr(attr);
                },
            }
        }
    }
    Ok(())
}

/// Re-create relationship `r_id` of `source` from `target`.
///
/// Returns the new id, or `None` when the reference cannot be carried over.
fn rewrite_relationship(source: &PartContext, target: &PartContext, r_id: &str) -> Result<Option<String>> {
    let rel = match source.relationship(r_id) {
        Ok(rel) => rel,
        Err(_) => {
            tracing::warn!(r_id, part = %source.partname(), "dropping reference to missing relationship");
            return Ok(None);
        },
    };

    if rel.is_external() {
        return target
            .relate_to_external(rel.target_ref(), rel.reltype())
            .map(Some);
    }

    let source_target = source.related_partname(r_id)?;
    if COPIED_RELTYPES.contains(&rel.reltype()) {
        let copied = copy_part(source, target, &source_target, 0)?;
        return target.add_relationship(&copied, rel.reltype()).map(Some);
    }

    if source.same_document(target) {
        return target.relate_to(&source_target, rel.reltype()).map(Some);
    }

    warn_dropped(&rel, source);
    Ok(None)
}

fn warn_dropped(rel: &Relationship, source: &PartContext) {
    tracing::warn!(
        reltype = rel.reltype(),
        target = rel.target_ref(),
        part = %source.partname(),
        "dropping relationship that cannot be carried over"
    );
}

/// Copy the bytes of `partname` from the source package into the target one.
///
/// Images and clips go through the media collection, so identical content
/// is stored once; anything else becomes a new part of the same type that
/// keeps its own relationships under their original ids.
fn copy_part(source: &PartContext, target: &PartContext, partname: &PackURI, depth: usize) -> Result<PackURI> {
    let part = source.document().part(partname.clone());
    let bytes = part.blob()?;
    let content_type = part.content_type()?;

    if let Some(format) = ImageFormat::from_mime_type(&content_type) {
        return target.add_media(&MediaStream::with_image_format(bytes, format), "image");
    }
    if let Some(format) = MediaFormat::from_mime_type(&content_type) {
        return target.add_media(&MediaStream::with_media_format(bytes, format), "media");
    }

    let new_partname = {
        let mut doc = target.document().borrow_mut();
        let package = doc.package_mut();
        let new_partname = package.next_partname(&numbered_template(partname))?;
        package.add_part(PartFactory::load(new_partname.clone(), content_type, bytes)?);
        new_partname
    };
    copy_relationships(&part, &target.document().part(new_partname.clone()), depth + 1)?;
    Ok(new_partname)
}

/// Give `copy` every relationship of `original`, with the same ids.
fn copy_relationships(original: &PartContext, copy: &PartContext, depth: usize) -> Result<()> {
    for rel in original.relationships()? {
        if rel.is_external() {
            copy.add_relationship_with_id(rel.r_id(), rel.reltype(), rel.target_ref(), true)?;
            continue;
        }
        if depth > MAX_PART_DEPTH {
            warn_dropped(&rel, original);
            continue;
        }
        let target = copy_part(original, copy, &rel.target_partname()?, depth)?;
        let target_ref = target.relative_ref(copy.partname().base_uri());
        copy.add_relationship_with_id(rel.r_id(), rel.reltype(), &target_ref, false)?;
    }
    Ok(())
}

/// `/ppt/embeddings/oleObject3.bin` becomes `/ppt/embeddings/oleObject%d.bin`.
fn numbered_template(partname: &PackURI) -> String {
    let uri = partname.as_str();
    let (stem, ext) = match uri.rfind('.') {
        Some(dot) if dot > uri.rfind('/').unwrap_or(0) => (&uri[..dot], &uri[dot..]),
        _ => (uri, ""),
    };
    format!("{}%d{}", stem.trim_end_matches(|c: char| c.is_ascii_digit()), ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;
    use crate::ooxml::pptx::shapes::collection::ShapeCollection;
    use crate::ooxml::pptx::shapes::test_support::{png_bytes, slide_part};
    use crate::ooxml::pptx::template;

    #[test]
    fn test_numbered_template() {
        let partname = PackURI::new("/ppt/embeddings/oleObject12.bin").unwrap();
        assert_eq!(numbered_template(&partname), "/ppt/embeddings/oleObject%d.bin");
        let partname = PackURI::new("/ppt/media/media.mp4").unwrap();
        assert_eq!(numbered_template(&partname), "/ppt/media/media%d.mp4");
    }

    fn picture_slide(tag: u8) -> (PartContext, XmlElement) {
        let part = slide_part();
        let stream = MediaStream::image(png_bytes(2, 2, tag)).unwrap();
        let partname = part.add_media(&stream, "image").unwrap();
        let r_id = part.relate_to(&partname, rt::IMAGE).unwrap();
        let pic = template::picture(3, "Picture 3", &r_id, None).unwrap();
        let link = XmlElement::with_attrs("a:hlinkClick", &[("r:id", "rIdLink")]);
        pic.path(&["nvPicPr", "cNvPr"]).unwrap().append(&link);
        let tree = part.shape_tree().unwrap();
        tree.append(&pic);
        (part, tree)
    }

    #[test]
    fn test_copy_within_slide() {
        let (part, tree) = picture_slide(1);
        let source = ShapeCollection::new(part.clone(), tree.clone()).get(0).unwrap();

        let copy = copy_shape(&source, &part, &tree).unwrap();
        let base = BaseShape::new(part.clone(), copy.clone());
        assert_eq!(base.id(), 4);
        assert_eq!(base.name(), "Picture 4");
        assert!(!copy.ptr_eq(source.element()));

        let new_r_id = copy.path(&["blipFill", "blip"]).unwrap().attr("r:embed").unwrap();
        let old_r_id = source.element().path(&["blipFill", "blip"]).unwrap().attr("r:embed").unwrap();
        assert_ne!(new_r_id, old_r_id);
        // Same bytes, so both relationships point at the one image part
        assert_eq!(part.related_partname(&new_r_id).unwrap(), part.related_partname(&old_r_id).unwrap());
        // The dangling hyperlink reference is dropped
        assert!(!copy.path(&["nvPicPr", "cNvPr", "hlinkClick"]).unwrap().has_attr("r:id"));
    }

    #[test]
    fn test_copy_across_documents() {
        let (source_part, source_tree) = picture_slide(7);
        let source = ShapeCollection::new(source_part, source_tree).get(0).unwrap();
        source_part_add_external_link(&source);

        let target = slide_part();
        let target_tree = target.shape_tree().unwrap();
        let copy = copy_shape(&source, &target, &target_tree).unwrap();

        let r_id = copy.path(&["blipFill", "blip"]).unwrap().attr("r:embed").unwrap();
        let partname = target.related_partname(&r_id).unwrap();
        let image = target.document().part(partname);
        assert_eq!(image.blob().unwrap(), png_bytes(2, 2, 7));
        assert_eq!(image.content_type().unwrap(), ct::PNG);

        let link = copy.path(&["nvPicPr", "cNvPr", "hlinkClick"]).unwrap();
        let rel = target.relationship(&link.attr("r:id").unwrap()).unwrap();
        assert!(rel.is_external());
        assert_eq!(rel.target_ref(), "https://example.com/");
        assert_eq!(BaseShape::new(target, copy).id(), 1);
    }

    fn source_part_add_external_link(source: &Shape) {
        let part = source.base().part();
        let r_id = part.relate_to_external("https://example.com/", rt::HYPERLINK).unwrap();
        source
            .element()
            .path(&["nvPicPr", "cNvPr", "hlinkClick"])
            .unwrap()
            .set_attr("r:id", &r_id);
    }

    #[test]
    fn test_table_copy_is_renamed() {
        let part = slide_part();
        let tree = part.shape_tree().unwrap();
        let table = template::table(2, "Table 1", "{S}", 10, 1, 10, 1).unwrap();
        tree.append(&table);
        let shape = ShapeCollection::new(part.clone(), tree.clone()).get(0).unwrap();
        let copy = copy_shape(&shape, &part, &tree).unwrap();
        assert_eq!(BaseShape::new(part, copy).name(), "Table 2");
    }
}
