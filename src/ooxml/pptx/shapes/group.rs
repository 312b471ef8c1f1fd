//! Group shapes (`p:grpSp`).
use crate::ooxml::pptx::shapes::base::BaseShape;
use crate::ooxml::pptx::shapes::collection::ShapeCollection;

/// A group of shapes, itself a shape tree.
#[derive(Debug, Clone)]
pub struct GroupShape {
    base: BaseShape,
}

impl GroupShape {
    pub(crate) fn new(base: BaseShape) -> Self {
        Self { base }
    }

    #[inline]
    pub fn base(&self) -> &BaseShape {
        &self.base
    }

    /// Members of the group, classified like a slide's shapes.
    pub fn shapes(&self) -> ShapeCollection {
        ShapeCollection::new(self.base.part().clone(), self.base.element().clone())
    }
}
