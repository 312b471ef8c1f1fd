//! The editable shape collection of a slide.
use crate::common::xml::XmlElement;
use crate::common::{Error, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::part::XmlPart;
use crate::ooxml::pptx::document::PartContext;
use crate::ooxml::pptx::format::{MediaFormat, MediaType};
use crate::ooxml::pptx::imaging;
use crate::ooxml::pptx::media::MediaStream;
use crate::ooxml::pptx::shapes::base::BaseShape;
use crate::ooxml::pptx::shapes::chart::BarChartType;
use crate::ooxml::pptx::shapes::collection::ShapeCollection;
use crate::ooxml::pptx::shapes::copy;
use crate::ooxml::pptx::shapes::geometry::Geometry;
use crate::ooxml::pptx::shapes::line::{LineFrame, Point};
use crate::ooxml::pptx::shapes::naming::{self, NameMatcher};
use crate::ooxml::pptx::shapes::Shape;
use crate::ooxml::pptx::template::{self, MediaRefs};

/// Total width of a new table, split evenly between its columns.
const TABLE_WIDTH_EMU: i64 = 8_128_000;
const TABLE_ROW_HEIGHT_EMU: i64 = 370_840;
/// "Medium Style 2 - Accent 1"
const DEFAULT_TABLE_STYLE: &str = "{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}";
/// Width and height of the preview of a new audio or video clip.
const MEDIA_EXTENT_EMU: i64 = 609_600;
const CHART_TEMPLATE: &str = "/ppt/charts/chart%d.xml";

/// Shapes of a slide, with operations that add and remove shapes.
///
/// Every operation edits the slide's shape tree in place; existing views of
/// the slide's shapes stay valid.
///
/// # Examples
///
/// ```rust,ignore
/// let shapes = pres.slide(1)?.shapes()?;
/// let rect = shapes.add_shape(50.0, 60.0, 100.0, 70.0, Geometry::RoundedRectangle)?;
/// if let Shape::AutoShape(auto) = &rect {
///     auto.text_box().unwrap().set_text("Hello")?;
/// }
/// shapes.add_line(10.0, 10.0, 20.0, 5.0)?;
/// shapes.add_picture(&std::fs::read("logo.png")?)?;
/// ```
#[derive(Debug, Clone)]
pub struct SlideShapes {
    shapes: ShapeCollection,
}

impl SlideShapes {
    pub(crate) fn new(part: PartContext, tree: XmlElement) -> Self {
        Self {
            shapes: ShapeCollection::new(part, tree),
        }
    }

    /// Read-only view of the same shape tree.
    pub fn collection(&self) -> &ShapeCollection {
        &self.shapes
    }

    pub fn shapes(&self) -> Vec<Shape> {
        self.shapes.shapes()
    }

    pub fn iter(&self) -> impl Iterator<Item = Shape> + use<> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Shape> {
        self.shapes.get(index)
    }

    pub fn last(&self) -> Option<Shape> {
        self.shapes.last()
    }

    pub fn get_by_id(&self, id: u32) -> Result<Shape> {
        self.shapes.get_by_id(id)
    }

    pub fn try_get_by_id(&self, id: u32) -> Option<Shape> {
        self.shapes.try_get_by_id(id)
    }

    pub fn get_by_name(&self, name: &str) -> Result<Shape> {
        self.shapes.get_by_name(name)
    }

    pub fn try_get_by_name(&self, name: &str) -> Option<Shape> {
        self.shapes.try_get_by_name(name)
    }

    fn part(&self) -> &PartContext {
        self.shapes.part()
    }

    fn tree(&self) -> &XmlElement {
        self.shapes.tree()
    }

    fn matcher(&self) -> NameMatcher {
        NameMatcher::new(self.part().options().name_match_budget)
    }

    /// Append `element` and return it as a shape.
    fn push(&self, element: XmlElement) -> Result<Shape> {
        self.tree().append(&element);
        self.classified(&element)
    }

    /// The shape an element of this tree classifies as.
    fn classified(&self, element: &XmlElement) -> Result<Shape> {
        self.shapes
            .iter()
            .find(|shape| shape.element().ptr_eq(element))
            .ok_or_else(|| Error::MalformedInput(format!("new {} is not a shape", element.name())))
    }

    /// Copy `shape`, possibly from another slide or presentation, onto this
    /// slide.
    ///
    /// Images and clips it refers to are copied along; an identical one
    /// already stored in this presentation is reused.
    pub fn add(&self, shape: &Shape) -> Result<Shape> {
        let element = copy::copy_shape(shape, self.part(), self.tree())?;
        self.classified(&element)
    }

    /// Add an AutoShape of `geometry`; position and size are in pixels.
    ///
    /// The shape is named after its geometry, has one empty paragraph and no
    /// outline.
    pub fn add_shape(&self, x: f64, y: f64, width: f64, height: f64, geometry: Geometry) -> Result<Shape> {
        let element = template::autoshape()?;
        let base = BaseShape::new(self.part().clone(), element.clone());
        base.set_geometry_type(geometry.clone())?;
        base.set_id(naming::next_id(self.tree()))?;
        base.set_name(geometry.name())?;
        base.set_x(x)?;
        base.set_y(y)?;
        base.set_width(width)?;
        base.set_height(height)?;

        tracing::debug!(id = base.id(), geometry = geometry.name(), "adding AutoShape");
        self.push(element)
    }

    /// Add a straight line from `(start_x, start_y)` to `(end_x, end_y)`, in
    /// pixels.
    pub fn add_line(&self, start_x: f64, start_y: f64, end_x: f64, end_y: f64) -> Result<Shape> {
        let frame = LineFrame::from_points(Point::new(start_x, start_y), Point::new(end_x, end_y));

        let element = template::line()?;
        let base = BaseShape::new(self.part().clone(), element.clone());
        let name = self.matcher().next_auto_name(&naming::names(self.tree()), "AutoShape")?;
        base.set_id(naming::next_id(self.tree()))?;
        base.set_name(&name)?;
        base.set_x(frame.x)?;
        base.set_y(frame.y)?;
        base.set_width(frame.cx)?;
        base.set_height(frame.cy)?;

        let xfrm = element
            .path(&["spPr", "xfrm"])
            .ok_or_else(|| Error::MalformedInput("no shape properties".to_string()))?;
        for (attr, flipped) in [("flipH", frame.flip_h), ("flipV", frame.flip_v)] {
            if flipped {
                xfrm.set_attr(attr, "1");
            } else {
                xfrm.remove_attr(attr);
            }
        }

        self.push(element)
    }

    /// Append a line given as a `p:cxnSp` fragment.
    ///
    /// The `a:`, `p:` and `r:` prefixes are declared for the fragment.
    pub fn add_line_xml(&self, xml: &str) -> Result<Shape> {
        let element = template::parse_fragment(xml)?;
        if !element.is("cxnSp") {
            return Err(Error::MalformedInput(format!(
                "expected a connector, got {}",
                element.name()
            )));
        }
        self.push(element)
    }

    /// Add a table of `columns` by `rows` empty cells at `(x, y)` pixels,
    /// with the default table style.
    pub fn add_table(&self, x: f64, y: f64, columns: usize, rows: usize) -> Result<Shape> {
        self.add_table_with_style(x, y, columns, rows, DEFAULT_TABLE_STYLE)
    }

    /// Like [`add_table`](Self::add_table), with the table style given by id.
    pub fn add_table_with_style(
        &self,
        x: f64,
        y: f64,
        columns: usize,
        rows: usize,
        style_id: &str,
    ) -> Result<Shape> {
        if columns == 0 || rows == 0 {
            return Err(Error::MalformedInput(format!(
                "a table needs at least one column and one row, got {}x{}",
                columns, rows
            )));
        }

        let id = naming::next_id(self.tree());
        let name = self.matcher().next_table_name(&naming::names(self.tree()))?;
        let column_width = TABLE_WIDTH_EMU / columns as i64;
        let element = template::table(
            id,
            &name,
            style_id,
            column_width,
            columns,
            TABLE_ROW_HEIGHT_EMU,
            rows,
        )?;

        let base = BaseShape::new(self.part().clone(), element.clone());
        base.set_x(x)?;
        base.set_y(y)?;
        base.set_width_emu(TABLE_WIDTH_EMU)?;
        base.set_height_emu(TABLE_ROW_HEIGHT_EMU * rows as i64)?;

        tracing::debug!(id, columns, rows, "adding table");
        self.push(element)
    }

    /// Add a picture from raster or SVG bytes.
    ///
    /// The picture is placed at the configured origin and scaled down to fit
    /// the configured size cap. SVG input keeps its vector bytes alongside a
    /// rendered PNG.
    pub fn add_picture(&self, bytes: &[u8]) -> Result<Shape> {
        let options = self.part().options();
        let prepared = imaging::prepare_picture(bytes, options.max_picture_size)?;

        let raster = self.part().add_media(&prepared.raster, "image")?;
        let embed = self.part().relate_to(&raster, rt::IMAGE)?;
        let svg_embed = match &prepared.svg {
            Some(svg) => {
                let partname = self.part().add_media(svg, "image")?;
                Some(self.part().relate_to(&partname, rt::IMAGE)?)
            },
            None => None,
        };

        let id = naming::next_id(self.tree());
        let element = template::picture(id, &format!("Picture {}", id), &embed, svg_embed.as_deref())?;
        let base = BaseShape::new(self.part().clone(), element.clone());
        base.set_x(options.picture_origin)?;
        base.set_y(options.picture_origin)?;
        base.set_width(prepared.width as f64)?;
        base.set_height(prepared.height as f64)?;

        tracing::debug!(
            id,
            width = prepared.width,
            height = prepared.height,
            svg = prepared.svg.is_some(),
            "adding picture"
        );
        self.push(element)
    }

    /// Add a single-series bar chart; position and size are in pixels.
    ///
    /// Each `(category, value)` pair of `data` becomes one bar. The values are
    /// stored in the chart itself, without an embedded workbook.
    pub fn add_bar_chart(
        &self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        chart_type: BarChartType,
        data: &[(&str, f64)],
    ) -> Result<Shape> {
        if data.is_empty() {
            return Err(Error::MalformedInput("a bar chart needs at least one category".to_string()));
        }

        let xml = template::bar_chart_space(chart_type, data)?;
        let chart = {
            let mut doc = self.part().document().borrow_mut();
            let package = doc.package_mut();
            let partname = package.next_partname(CHART_TEMPLATE)?;
            package.add_part(Box::new(XmlPart::new(
                partname.clone(),
                ct::DML_CHART.to_string(),
                xml.into_bytes(),
            )));
            partname
        };
        let r_id = self.part().relate_to(&chart, rt::CHART)?;

        let id = naming::next_id(self.tree());
        let element = template::chart_frame(id, &format!("Chart {}", id), &r_id)?;
        let base = BaseShape::new(self.part().clone(), element.clone());
        base.set_x(x)?;
        base.set_y(y)?;
        base.set_width(width)?;
        base.set_height(height)?;

        tracing::debug!(id, chart = %chart, ?chart_type, "adding bar chart");
        self.push(element)
    }

    /// Add an MP3 or WAV clip at `(x, y)` pixels.
    pub fn add_audio(&self, x: f64, y: f64, bytes: &[u8]) -> Result<Shape> {
        self.add_media(x, y, bytes, MediaType::Audio)
    }

    /// Add an MP4 clip at `(x, y)` pixels.
    pub fn add_video(&self, x: f64, y: f64, bytes: &[u8]) -> Result<Shape> {
        self.add_media(x, y, bytes, MediaType::Video)
    }

    fn add_media(&self, x: f64, y: f64, bytes: &[u8], media_type: MediaType) -> Result<Shape> {
        let format = MediaFormat::detect_from_bytes(bytes)
            .filter(|format| format.media_type() == media_type)
            .ok_or_else(|| {
                Error::DecodeFailure(format!("Not a supported {} clip", media_type.mime_prefix()))
            })?;

        let part = self.part();
        let clip = part.add_media(&MediaStream::with_media_format(bytes.to_vec(), format), "media")?;
        let preview = MediaStream::image(imaging::media_placeholder_png(media_type)?)?;
        let preview = part.add_media(&preview, "image")?;

        let link = part.add_relationship(&clip, media_type.relationship_type())?;
        let media = part.add_relationship(&clip, rt::MEDIA)?;
        let preview = part.relate_to(&preview, rt::IMAGE)?;

        let id = naming::next_id(self.tree());
        let name = match media_type {
            MediaType::Audio => format!("Audio {}", id),
            MediaType::Video => format!("Video{}", id),
        };
        let refs = MediaRefs {
            preview: &preview,
            link: &link,
            media: &media,
        };
        let element = template::media_picture(id, &name, media_type, refs)?;
        let base = BaseShape::new(part.clone(), element.clone());
        base.set_x(x)?;
        base.set_y(y)?;
        base.set_width_emu(MEDIA_EXTENT_EMU)?;
        base.set_height_emu(MEDIA_EXTENT_EMU)?;

        tracing::debug!(id, mime = format.mime_type(), "adding media clip");
        self.push(element)
    }

    /// Remove `shape` from the slide.
    ///
    /// Relationships the shape used are left in place.
    pub fn remove(&self, shape: &Shape) -> Result<()> {
        let member = naming::shape_elements(self.tree())
            .iter()
            .any(|element| element.ptr_eq(shape.element()));
        if !member {
            return Err(Error::NotFound(format!(
                "shape {} is not on {}",
                shape.name(),
                self.part().partname()
            )));
        }
        if !shape.is_removable() {
            return Err(Error::UnsupportedOperation(format!(
                "{:?} shapes cannot be removed",
                shape.kind()
            )));
        }

        shape.base().detach();
        tracing::debug!(id = shape.id(), "removed shape");
        Ok(())
    }
}
