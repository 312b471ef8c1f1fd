//! The presentation: entry point for opening, creating and saving `.pptx`
//! files.
use crate::common::xml::XmlElement;
use crate::common::{Error, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::part::XmlPart;
use crate::ooxml::pptx::document::{Document, DocumentState, PartContext};
use crate::ooxml::pptx::options::PresentationOptions;
use crate::ooxml::pptx::shapes::{copy, naming};
use crate::ooxml::pptx::slide::{Slide, SlideLayout, SlideMaster};
use crate::ooxml::pptx::template;
use std::path::Path;

const PRESENTATION_URI: &str = "/ppt/presentation.xml";
const SLIDE_MASTER_URI: &str = "/ppt/slideMasters/slideMaster1.xml";
const SLIDE_LAYOUT_URI: &str = "/ppt/slideLayouts/slideLayout1.xml";
const THEME_URI: &str = "/ppt/theme/theme1.xml";
const SLIDE_TEMPLATE: &str = "/ppt/slides/slide%d.xml";

/// Smallest id PowerPoint accepts in `p:sldIdLst`.
const MIN_SLIDE_ID: i64 = 256;

/// Placeholder types a new slide does not get a stand-in for.
const SKIPPED_PLACEHOLDERS: &[&str] = &["dt", "ftr", "sldNum"];

/// Children of `p:presentation` that precede `p:sldIdLst`.
const SLIDE_LIST_PREDECESSORS: &[&str] = &["handoutMasterIdLst", "notesMasterIdLst", "sldMasterIdLst"];

/// An open PowerPoint presentation.
///
/// Slides and shapes obtained from a presentation share its state; edits made
/// through them are written out by [`save`](Self::save) and
/// [`to_bytes`](Self::to_bytes).
///
/// # Examples
///
/// ```rust,no_run
/// use longan::ooxml::pptx::{Geometry, Presentation};
///
/// let pres = Presentation::open("deck.pptx")?;
/// let shapes = pres.slide(1)?.shapes()?;
/// shapes.add_shape(50.0, 60.0, 100.0, 70.0, Geometry::Rectangle)?;
/// pres.save("deck-edited.pptx")?;
/// # Ok::<(), longan::common::Error>(())
/// ```
pub struct Presentation {
    doc: Document,
    partname: PackURI,
}

impl Presentation {
    /// A blank presentation with one empty slide and default options.
    pub fn new() -> Result<Self> {
        Self::new_with(PresentationOptions::default())
    }

    /// A blank presentation with one empty slide.
    pub fn new_with(options: PresentationOptions) -> Result<Self> {
        let mut package = OpcPackage::new();
        let parts = [
            (PRESENTATION_URI, ct::PML_PRESENTATION_MAIN, template::default_presentation_xml()),
            (SLIDE_MASTER_URI, ct::PML_SLIDE_MASTER, template::default_slide_master_xml()),
            (SLIDE_LAYOUT_URI, ct::PML_SLIDE_LAYOUT, template::default_slide_layout_xml()),
            (THEME_URI, ct::OFC_THEME, template::default_theme_xml()),
        ];
        for (partname, content_type, xml) in parts {
            package.add_part(Box::new(XmlPart::new(
                partname_of(partname)?,
                content_type.to_string(),
                xml.as_bytes().to_vec(),
            )));
        }
        package
            .rels_mut()
            .add(rt::OFFICE_DOCUMENT, PRESENTATION_URI.trim_start_matches('/'), false);

        let pres = Self::from_package(package, options)?;
        let part = pres.part();
        let master = pres.doc.part(partname_of(SLIDE_MASTER_URI)?);
        let layout = pres.doc.part(partname_of(SLIDE_LAYOUT_URI)?);
        let theme = partname_of(THEME_URI)?;

        let r_id = part.relate_to(master.partname(), rt::SLIDE_MASTER)?;
        set_first_r_id(&part, "sldMasterIdLst", &r_id)?;
        part.relate_to(&theme, rt::THEME)?;

        let r_id = master.relate_to(layout.partname(), rt::SLIDE_LAYOUT)?;
        set_first_r_id(&master, "sldLayoutIdLst", &r_id)?;
        master.relate_to(&theme, rt::THEME)?;
        layout.relate_to(master.partname(), rt::SLIDE_MASTER)?;

        pres.add_empty_slide()?;
        tracing::debug!("created blank presentation");
        Ok(pres)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, PresentationOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: PresentationOptions) -> Result<Self> {
        Self::from_package(OpcPackage::open(path)?, options)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with(bytes, PresentationOptions::default())
    }

    pub fn from_bytes_with(bytes: &[u8], options: PresentationOptions) -> Result<Self> {
        Self::from_package(OpcPackage::from_bytes(bytes)?, options)
    }

    fn from_package(package: OpcPackage, options: PresentationOptions) -> Result<Self> {
        let partname = package.main_document_partname()?;
        if !package.contains_part(&partname) {
            return Err(Error::NotFound(format!("main document part {}", partname)));
        }
        Ok(Self {
            doc: Document::new(DocumentState::new(package, options)),
            partname,
        })
    }

    /// Write the presentation, with every edit, to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut doc = self.doc.borrow_mut();
        doc.flush()?;
        doc.package().save(path)?;
        Ok(())
    }

    /// The presentation, with every edit, as `.pptx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut doc = self.doc.borrow_mut();
        doc.flush()?;
        Ok(doc.package().to_bytes()?)
    }

    pub fn options(&self) -> PresentationOptions {
        self.doc.borrow().options()
    }

    fn part(&self) -> PartContext {
        self.doc.part(self.partname.clone())
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> Result<Vec<Slide>> {
        let part = self.part();
        let Some(list) = part.dom()?.child("sldIdLst") else {
            return Ok(Vec::new());
        };
        list.children_named("sldId")
            .iter()
            .enumerate()
            .map(|(idx, sld_id)| {
                let r_id = sld_id
                    .attr("r:id")
                    .ok_or_else(|| Error::MalformedInput("slide id without relationship".to_string()))?;
                Ok(Slide::new(part.related_part(&r_id)?, idx + 1))
            })
            .collect()
    }

    /// Slide `number`, counting from 1.
    pub fn slide(&self, number: usize) -> Result<Slide> {
        let count = self.slide_count()?;
        if number == 0 || number > count {
            return Err(Error::NotFound(format!(
                "slide {} of a presentation with {} slides",
                number, count
            )));
        }
        self.slides()?
            .into_iter()
            .nth(number - 1)
            .ok_or_else(|| Error::NotFound(format!("slide {}", number)))
    }

    pub fn slide_count(&self) -> Result<usize> {
        Ok(self
            .part()
            .dom()?
            .child("sldIdLst")
            .map_or(0, |list| list.children_named("sldId").len()))
    }

    /// Slide masters in `p:sldMasterIdLst` order.
    pub fn slide_masters(&self) -> Result<Vec<SlideMaster>> {
        let part = self.part();
        let Some(list) = part.dom()?.child("sldMasterIdLst") else {
            return Ok(Vec::new());
        };
        list.children_named("sldMasterId")
            .iter()
            .map(|id| {
                let r_id = id.attr("r:id").ok_or_else(|| {
                    Error::MalformedInput("slide master id without relationship".to_string())
                })?;
                Ok(SlideMaster::new(part.related_part(&r_id)?))
            })
            .collect()
    }

    fn first_layout(&self) -> Result<SlideLayout> {
        for master in self.slide_masters()? {
            if let Some(layout) = master.layouts()?.into_iter().next() {
                return Ok(layout);
            }
        }
        Err(Error::NotFound("slide layout".to_string()))
    }

    /// Append a slide based on the first layout.
    pub fn add_empty_slide(&self) -> Result<Slide> {
        self.add_empty_slide_with_layout(&self.first_layout()?)
    }

    /// Append a slide based on `layout`, which must belong to this
    /// presentation.
    ///
    /// The slide gets an empty shape for each placeholder of the layout,
    /// except the date, footer and slide number.
    pub fn add_empty_slide_with_layout(&self, layout: &SlideLayout) -> Result<Slide> {
        if !layout.part().same_document(&self.part()) {
            return Err(Error::NotFound(format!(
                "layout {} in this presentation",
                layout.partname()
            )));
        }

        let slide = self.insert_slide(template::empty_slide_xml().as_bytes().to_vec(), layout)?;
        let tree = slide.part().shape_tree()?;
        for shape in layout.part().shape_tree()?.children_named("sp") {
            let Some(ph) = shape.path(&["nvSpPr", "nvPr", "ph"]) else {
                continue;
            };
            if ph
                .attr("type")
                .is_some_and(|kind| SKIPPED_PLACEHOLDERS.contains(&kind.as_str()))
            {
                continue;
            }

            let id = naming::next_id(&tree);
            let name = shape
                .path(&["nvSpPr", "cNvPr"])
                .and_then(|c_nv_pr| c_nv_pr.attr("name"))
                .unwrap_or_else(|| format!("Placeholder {}", id));
            let stand_in = template::placeholder(id, &name, shape.child("txBody").is_some())?;
            stand_in
                .path(&["nvSpPr", "nvPr"])
                .ok_or_else(|| Error::MalformedInput("placeholder has no nvPr".to_string()))?
                .append(&ph.deep_clone());
            tree.append(&stand_in);
        }
        Ok(slide)
    }

    /// Append a copy of `source`, which may belong to another presentation.
    ///
    /// Pictures, clips and charts are copied along; media identical to what
    /// this presentation already stores is shared. A slide from another
    /// presentation is based on the layout with the same name here, or on the
    /// first layout when there is none.
    pub fn add_slide_from(&self, source: &Slide) -> Result<Slide> {
        let layout = self.layout_for(source)?;
        let xml = source.part().dom()?.to_document().into_bytes();
        let slide = self.insert_slide(xml, &layout)?;
        copy::rewrite_references(&slide.part().dom()?, source.part(), slide.part())?;

        tracing::debug!(from = %source.partname(), to = %slide.partname(), "copied slide");
        Ok(slide)
    }

    /// Layout of this presentation that a copy of `source` is based on.
    fn layout_for(&self, source: &Slide) -> Result<SlideLayout> {
        let layout = match source.layout() {
            Ok(layout) if layout.part().same_document(&self.part()) => return Ok(layout),
            Ok(layout) => layout,
            Err(_) => return self.first_layout(),
        };

        if let Some(name) = layout.name()? {
            for master in self.slide_masters()? {
                for candidate in master.layouts()? {
                    if candidate.name()?.as_deref() == Some(name.as_str()) {
                        return Ok(candidate);
                    }
                }
            }
        }
        self.first_layout()
    }

    /// Add a slide part holding `xml`, related to `layout`, at the end of the
    /// slide list.
    fn insert_slide(&self, xml: Vec<u8>, layout: &SlideLayout) -> Result<Slide> {
        let partname = self.doc.borrow().package().next_partname(SLIDE_TEMPLATE)?;
        self.doc.borrow_mut().package_mut().add_part(Box::new(XmlPart::new(
            partname.clone(),
            ct::PML_SLIDE.to_string(),
            xml,
        )));

        let slide = self.doc.part(partname.clone());
        slide.relate_to(layout.partname(), rt::SLIDE_LAYOUT)?;

        let part = self.part();
        let r_id = part.relate_to(&partname, rt::SLIDE)?;
        let list = slide_id_list(&part.dom()?)?;
        let id = list
            .children_named("sldId")
            .iter()
            .filter_map(|sld_id| sld_id.attr_i64("id"))
            .max()
            .map_or(MIN_SLIDE_ID, |max| (max + 1).max(MIN_SLIDE_ID));
        list.append(&XmlElement::with_attrs(
            "p:sldId",
            &[("id", id.to_string().as_str()), ("r:id", r_id.as_str())],
        ));

        let number = list.children_named("sldId").len();
        tracing::debug!(slide = %partname, number, "added slide");
        Ok(Slide::new(slide, number))
    }

    /// Slide width in pixels.
    pub fn slide_width(&self) -> Result<f64> {
        let (cx, _) = self.slide_size_emu()?;
        Ok(self.options().dpi.horizontal_emu_to_px(cx))
    }

    /// Slide height in pixels.
    pub fn slide_height(&self) -> Result<f64> {
        let (_, cy) = self.slide_size_emu()?;
        Ok(self.options().dpi.vertical_emu_to_px(cy))
    }

    fn slide_size_emu(&self) -> Result<(i64, i64)> {
        let sld_sz = self
            .part()
            .dom()?
            .child("sldSz")
            .ok_or_else(|| Error::MalformedInput("presentation has no slide size".to_string()))?;
        Ok((
            sld_sz.attr_i64("cx").unwrap_or(0),
            sld_sz.attr_i64("cy").unwrap_or(0),
        ))
    }
}

impl std::fmt::Debug for Presentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presentation")
            .field("partname", &self.partname)
            .finish()
    }
}

fn partname_of(uri: &str) -> Result<PackURI> {
    PackURI::new(uri).map_err(Error::InvalidFormat)
}

/// Point the first entry of id list `list` of `part` at `r_id`.
fn set_first_r_id(part: &PartContext, list: &str, r_id: &str) -> Result<()> {
    let entry = part
        .dom()?
        .child(list)
        .and_then(|l| l.first_child())
        .ok_or_else(|| Error::MalformedInput(format!("{} has no {}", part.partname(), list)))?;
    entry.set_attr("r:id", r_id);
    Ok(())
}

/// `p:sldIdLst`, created in schema order when missing.
fn slide_id_list(presentation: &XmlElement) -> Result<XmlElement> {
    if let Some(list) = presentation.child("sldIdLst") {
        return Ok(list);
    }
    let list = XmlElement::new("p:sldIdLst");
    let predecessor = SLIDE_LIST_PREDECESSORS
        .iter()
        .find_map(|name| presentation.child(name));
    match predecessor {
        Some(predecessor) => predecessor.insert_after(&list)?,
        None => presentation.prepend(&list),
    }
    Ok(list)
}
