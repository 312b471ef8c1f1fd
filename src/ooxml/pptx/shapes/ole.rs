//! Embedded OLE objects (`p:graphicFrame` with a `p:oleObj`).
use crate::common::xml::XmlElement;
use crate::ooxml::pptx::shapes::base::BaseShape;

/// An OLE object frame. Read-only: the embedded part is not managed here.
#[derive(Debug, Clone)]
pub struct OleObject {
    base: BaseShape,
}

impl OleObject {
    pub(crate) fn new(base: BaseShape) -> Self {
        Self { base }
    }

    #[inline]
    pub fn base(&self) -> &BaseShape {
        &self.base
    }

    fn ole_obj(&self) -> Option<XmlElement> {
        self.base
            .element()
            .path(&["graphic", "graphicData"])?
            .first_descendant("oleObj")
    }

    /// Programmatic identifier of the embedding server, e.g. `Excel.Sheet.12`.
    pub fn prog_id(&self) -> Option<String> {
        self.ole_obj()?.attr("progId")
    }

    pub fn object_name(&self) -> Option<String> {
        self.ole_obj()?.attr("name")
    }

    /// Relationship id of the embedded or linked object part.
    pub fn r_id(&self) -> Option<String> {
        self.ole_obj()?.attr("r:id")
    }
}
