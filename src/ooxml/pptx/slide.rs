//! Slides, slide layouts and slide masters.
//!
//! Only slides can be edited; layouts and masters expose read-only shape
//! collections.
use crate::common::{Error, Result};
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::pptx::document::PartContext;
use crate::ooxml::pptx::shapes::{ShapeCollection, SlideShapes};

/// A slide in a presentation.
///
/// # Examples
///
/// ```rust,ignore
/// let pres = Presentation::open("deck.pptx")?;
/// let slide = pres.slide(1)?;
/// println!("{} shapes on slide {}", slide.shapes()?.len(), slide.number());
/// println!("layout: {:?}", slide.layout()?.name()?);
/// ```
#[derive(Debug, Clone)]
pub struct Slide {
    part: PartContext,
    number: usize,
}

impl Slide {
    pub(crate) fn new(part: PartContext, number: usize) -> Self {
        Self { part, number }
    }

    /// 1-based position of the slide in the presentation.
    #[inline]
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn partname(&self) -> &PackURI {
        self.part.partname()
    }

    pub(crate) fn part(&self) -> &PartContext {
        &self.part
    }

    /// Editable shapes of the slide.
    pub fn shapes(&self) -> Result<SlideShapes> {
        Ok(SlideShapes::new(self.part.clone(), self.part.shape_tree()?))
    }

    /// The layout the slide is based on.
    pub fn layout(&self) -> Result<SlideLayout> {
        Ok(SlideLayout::new(self.part.related_part_by_type(rt::SLIDE_LAYOUT)?))
    }
}

/// A slide layout.
#[derive(Debug, Clone)]
pub struct SlideLayout {
    part: PartContext,
}

impl SlideLayout {
    pub(crate) fn new(part: PartContext) -> Self {
        Self { part }
    }

    pub fn partname(&self) -> &PackURI {
        self.part.partname()
    }

    pub(crate) fn part(&self) -> &PartContext {
        &self.part
    }

    /// Layout name (`p:cSld/@name`).
    pub fn name(&self) -> Result<Option<String>> {
        Ok(self.part.dom()?.child("cSld").and_then(|c| c.attr("name")))
    }

    pub fn shapes(&self) -> Result<ShapeCollection> {
        Ok(ShapeCollection::new(self.part.clone(), self.part.shape_tree()?))
    }

    pub fn master(&self) -> Result<SlideMaster> {
        Ok(SlideMaster::new(self.part.related_part_by_type(rt::SLIDE_MASTER)?))
    }
}

/// A slide master.
#[derive(Debug, Clone)]
pub struct SlideMaster {
    part: PartContext,
}

impl SlideMaster {
    pub(crate) fn new(part: PartContext) -> Self {
        Self { part }
    }

    pub fn partname(&self) -> &PackURI {
        self.part.partname()
    }

    pub fn shapes(&self) -> Result<ShapeCollection> {
        Ok(ShapeCollection::new(self.part.clone(), self.part.shape_tree()?))
    }

    /// Layouts of this master, in `p:sldLayoutIdLst` order.
    pub fn layouts(&self) -> Result<Vec<SlideLayout>> {
        let dom = self.part.dom()?;
        let Some(list) = dom.child("sldLayoutIdLst") else {
            return Ok(Vec::new());
        };
        list.children_named("sldLayoutId")
            .iter()
            .map(|id| {
                let r_id = id.attr("r:id").ok_or_else(|| {
                    Error::MalformedInput("slide layout id without relationship".to_string())
                })?;
                Ok(SlideLayout::new(self.part.related_part(&r_id)?))
            })
            .collect()
    }
}
