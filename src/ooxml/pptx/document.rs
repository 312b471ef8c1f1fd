//! Shared state of one open presentation.
//!
//! Every slide, collection and shape view holds a cheap handle to the same
//! [`DocumentState`]: the OPC package, the parsed XML tree of each part that has
//! been read, and the media deduplication index. Parsed trees are the single
//! source of truth while the presentation is open; they are serialized back
//! into their parts when the presentation is saved.

use crate::common::unit::Dpi;
use crate::common::xml::XmlElement;
use crate::common::{Error, Result};
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationship;
use crate::ooxml::pptx::media::{MediaCollection, MediaStream};
use crate::ooxml::pptx::options::PresentationOptions;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

/// Package, parsed part trees and media index of one presentation.
pub(crate) struct DocumentState {
    package: OpcPackage,
    media: MediaCollection,
    options: PresentationOptions,
    doms: HashMap<PackURI, XmlElement>,
}

impl DocumentState {
    pub(crate) fn new(package: OpcPackage, options: PresentationOptions) -> Self {
        Self {
            package,
            media: MediaCollection::new(),
            options,
            doms: HashMap::new(),
        }
    }

    pub(crate) fn package(&self) -> &OpcPackage {
        &self.package
    }

    pub(crate) fn package_mut(&mut self) -> &mut OpcPackage {
        &mut self.package
    }

    pub(crate) fn options(&self) -> PresentationOptions {
        self.options
    }

    /// Parsed tree of an XML part, parsing it on first access.
    pub(crate) fn dom(&mut self, partname: &PackURI) -> Result<XmlElement> {
        if let Some(dom) = self.doms.get(partname) {
            return Ok(dom.clone());
        }

        let part = self.package.get_part(partname)?;
        let dom = XmlElement::parse(std::str::from_utf8(part.blob())?)?;
        self.doms.insert(partname.clone(), dom.clone());
        Ok(dom)
    }

    /// Store `stream` as a media part, reusing a byte-identical one.
    pub(crate) fn add_media(&mut self, stream: &MediaStream, stem: &str) -> Result<PackURI> {
        self.media.get_or_add_part(&mut self.package, stream, stem)
    }

    /// Serialize every parsed tree back into its part.
    pub(crate) fn flush(&mut self) -> Result<()> {
        for (partname, dom) in &self.doms {
            let part = self.package.get_part_mut(partname)?;
            part.set_blob(dom.to_document().into_bytes());
        }
        tracing::debug!(parts = self.doms.len(), "flushed edited parts");
        Ok(())
    }
}

/// Reference-counted handle to a [`DocumentState`].
#[derive(Clone)]
pub(crate) struct Document(Rc<RefCell<DocumentState>>);

impl Document {
    pub(crate) fn new(state: DocumentState) -> Self {
        Self(Rc::new(RefCell::new(state)))
    }

    pub(crate) fn borrow(&self) -> Ref<'_, DocumentState> {
        self.0.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, DocumentState> {
        self.0.borrow_mut()
    }

    /// Whether both handles refer to the same open presentation.
    pub(crate) fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Context for reading and editing one part of this presentation.
    pub(crate) fn part(&self, partname: PackURI) -> PartContext {
        PartContext {
            doc: self.clone(),
            partname,
        }
    }
}

/// One part of an open presentation, as seen by the shapes it contains.
///
/// Each call borrows the shared state only for its own duration, so views can
/// be held and combined freely.
#[derive(Clone)]
pub(crate) struct PartContext {
    doc: Document,
    partname: PackURI,
}

impl PartContext {
    pub(crate) fn partname(&self) -> &PackURI {
        &self.partname
    }

    pub(crate) fn document(&self) -> &Document {
        &self.doc
    }

    pub(crate) fn dom(&self) -> Result<XmlElement> {
        self.doc.borrow_mut().dom(&self.partname)
    }

    /// `p:cSld/p:spTree` of a slide, layout or master part.
    pub(crate) fn shape_tree(&self) -> Result<XmlElement> {
        self.dom()?
            .path(&["cSld", "spTree"])
            .ok_or_else(|| Error::MalformedInput(format!("{} has no shape tree", self.partname)))
    }

    pub(crate) fn options(&self) -> PresentationOptions {
        self.doc.borrow().options()
    }

    pub(crate) fn dpi(&self) -> Dpi {
        self.options().dpi
    }

    /// Whether both contexts belong to the same open presentation.
    pub(crate) fn same_document(&self, other: &PartContext) -> bool {
        self.doc.ptr_eq(&other.doc)
    }

    pub(crate) fn relationship(&self, r_id: &str) -> Result<Relationship> {
        let doc = self.doc.borrow();
        doc.package()
            .get_part(&self.partname)?
            .rels()
            .get(r_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("relationship {} in {}", r_id, self.partname)))
    }

    /// Every relationship of this part, in no particular order.
    pub(crate) fn relationships(&self) -> Result<Vec<Relationship>> {
        let doc = self.doc.borrow();
        Ok(doc.package().get_part(&self.partname)?.rels().iter().cloned().collect())
    }

    /// Partname an internal relationship of this part points at.
    pub(crate) fn related_partname(&self, r_id: &str) -> Result<PackURI> {
        Ok(self
            .doc
            .borrow()
            .package()
            .related_partname(&self.partname, r_id)?)
    }

    /// Context for the part an internal relationship points at.
    pub(crate) fn related_part(&self, r_id: &str) -> Result<PartContext> {
        Ok(self.doc.part(self.related_partname(r_id)?))
    }

    /// Context for the single part related to this one by `reltype`.
    pub(crate) fn related_part_by_type(&self, reltype: &str) -> Result<PartContext> {
        let partname = self
            .doc
            .borrow()
            .package()
            .get_part(&self.partname)?
            .rels()
            .part_with_reltype(reltype)?
            .target_partname()?;
        Ok(self.doc.part(partname))
    }

    pub(crate) fn blob(&self) -> Result<Vec<u8>> {
        Ok(self.doc.borrow().package().get_part(&self.partname)?.blob().to_vec())
    }

    pub(crate) fn content_type(&self) -> Result<String> {
        Ok(self
            .doc
            .borrow()
            .package()
            .get_part(&self.partname)?
            .content_type()
            .to_string())
    }

    /// Get or add an internal relationship to `target`, returning its id.
    pub(crate) fn relate_to(&self, target: &PackURI, reltype: &str) -> Result<String> {
        let mut doc = self.doc.borrow_mut();
        let part = doc.package_mut().get_part_mut(&self.partname)?;
        Ok(part.relate_to(target, reltype))
    }

    /// Always add a new internal relationship to `target`.
    pub(crate) fn add_relationship(&self, target: &PackURI, reltype: &str) -> Result<String> {
        let mut doc = self.doc.borrow_mut();
        let part = doc.package_mut().get_part_mut(&self.partname)?;
        let target_ref = target.relative_ref(self.partname.base_uri());
        Ok(part.rels_mut().add(reltype, &target_ref, false))
    }

    /// Add a relationship under a caller-chosen id, replacing any with that id.
    pub(crate) fn add_relationship_with_id(
        &self,
        r_id: &str,
        reltype: &str,
        target_ref: &str,
        is_external: bool,
    ) -> Result<()> {
        let mut doc = self.doc.borrow_mut();
        let part = doc.package_mut().get_part_mut(&self.partname)?;
        part.rels_mut().add_relationship(
            reltype.to_string(),
            target_ref.to_string(),
            r_id.to_string(),
            is_external,
        );
        Ok(())
    }

    /// Get or add an external relationship to `url`.
    pub(crate) fn relate_to_external(&self, url: &str, reltype: &str) -> Result<String> {
        let mut doc = self.doc.borrow_mut();
        let part = doc.package_mut().get_part_mut(&self.partname)?;
        Ok(part.relate_to_ext(url, reltype))
    }

    /// Store media content in the package, deduplicated by content hash.
    pub(crate) fn add_media(&self, stream: &MediaStream, stem: &str) -> Result<PackURI> {
        self.doc.borrow_mut().add_media(stream, stem)
    }

    /// Drop relationship `r_id` when no element of this part refers to it.
    pub(crate) fn prune_relationship(&self, r_id: &str) -> Result<bool> {
        let dom = self.dom()?;
        let referenced = std::iter::once(dom.clone())
            .chain(dom.descendants())
            .any(|element| {
                ["r:embed", "r:link", "r:id"]
                    .iter()
                    .any(|attr| element.attr(attr).as_deref() == Some(r_id))
            });
        if referenced {
            return Ok(false);
        }

        let mut doc = self.doc.borrow_mut();
        let part = doc.package_mut().get_part_mut(&self.partname)?;
        Ok(part.rels_mut().remove(r_id).is_some())
    }
}

impl std::fmt::Debug for PartContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartContext")
            .field("partname", &self.partname)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
    use crate::ooxml::opc::part::XmlPart;

    fn document_with_slide() -> (Document, PackURI) {
        let mut package = OpcPackage::new();
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        package.add_part(Box::new(XmlPart::new(
            slide.clone(),
            ct::PML_SLIDE.to_string(),
            crate::ooxml::pptx::template::empty_slide_xml().as_bytes().to_vec(),
        )));
        (
            Document::new(DocumentState::new(package, PresentationOptions::default())),
            slide,
        )
    }

    #[test]
    fn test_dom_is_cached_and_flushed() {
        let (doc, slide) = document_with_slide();
        let part = doc.part(slide.clone());

        let tree = part.shape_tree().unwrap();
        tree.append(&XmlElement::new("p:sp"));
        assert!(part.dom().unwrap().ptr_eq(&part.dom().unwrap()));

        doc.borrow_mut().flush().unwrap();
        let blob = part.blob().unwrap();
        let reparsed = XmlElement::parse(std::str::from_utf8(&blob).unwrap()).unwrap();
        assert_eq!(reparsed.path(&["cSld", "spTree"]).unwrap().children_named("sp").len(), 1);
    }

    #[test]
    fn test_relationships_and_pruning() {
        let (doc, slide) = document_with_slide();
        let part = doc.part(slide);
        let image = PackURI::new("/ppt/media/image1.png").unwrap();

        let r_id = part.relate_to(&image, rt::IMAGE).unwrap();
        assert_eq!(part.relate_to(&image, rt::IMAGE).unwrap(), r_id);
        let fresh = part.add_relationship(&image, rt::IMAGE).unwrap();
        assert_ne!(fresh, r_id);
        assert_eq!(part.relationship(&r_id).unwrap().target_ref(), "../media/image1.png");

        let pic = XmlElement::with_attrs("a:blip", &[("r:embed", r_id.as_str())]);
        part.shape_tree().unwrap().append(&pic);
        assert!(!part.prune_relationship(&r_id).unwrap());
        assert!(part.prune_relationship(&fresh).unwrap());
        assert!(part.relationship(&fresh).is_err());
    }

    #[test]
    fn test_same_document() {
        let (doc, slide) = document_with_slide();
        let (other, other_slide) = document_with_slide();
        assert!(doc.part(slide.clone()).same_document(&doc.part(slide)));
        assert!(!doc.part(other_slide.clone()).same_document(&other.part(other_slide)));
    }
}
