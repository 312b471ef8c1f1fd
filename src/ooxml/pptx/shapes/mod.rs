/// Shapes module for PowerPoint presentations.
///
/// A slide's shape tree is read as an ordered list of [`Shape`] values, one per
/// top-level element, each a view over the element it was classified from:
/// - AutoShapes with optional text
/// - Pictures, audio and video clips
/// - Lines (connectors)
/// - Tables, charts and OLE objects (graphic frames)
/// - Groups, which hold a nested shape tree
///
/// Views hold no state of their own, so a change made through one view is
/// visible through every other view of the same element.
pub mod autoshape;
pub mod base;
pub mod chart;
pub mod collection;
pub(crate) mod copy;
pub mod fill;
pub mod geometry;
pub mod group;
pub mod line;
pub mod media_shape;
pub(crate) mod naming;
pub mod ole;
pub mod outline;
pub mod picture;
pub mod slide_shapes;
pub mod table;
pub mod textframe;

pub use autoshape::AutoShape;
pub use base::BaseShape;
pub use chart::{BarChartType, Category, Chart, ChartType};
pub use collection::ShapeCollection;
pub use fill::{Fill, FillType};
pub use geometry::{Geometry, ShapeGeometry};
pub use group::GroupShape;
pub use line::{Line, LineFrame, Point};
pub use media_shape::MediaShape;
pub use ole::OleObject;
pub use outline::Outline;
pub use picture::{CroppingFrame, Image, Picture};
pub use slide_shapes::SlideShapes;
pub use table::{Table, TableCell, TableColumn, TableRow};
pub use textframe::{Paragraph, TextBox};

use crate::common::Result;
use crate::common::xml::XmlElement;

/// Variant tag of a [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    AutoShape,
    Picture,
    Line,
    Table,
    Chart,
    Group,
    Media,
    Ole,
}

/// A shape on a slide, layout or master.
///
/// # Examples
///
/// ```rust,ignore
/// for shape in slide.shapes()?.iter() {
///     match &shape {
///         Shape::AutoShape(auto) => {
///             if let Some(text_box) = auto.text_box() {
///                 println!("{}: {}", shape.name(), text_box.text());
///             }
///         },
///         Shape::Picture(picture) => println!("picture {}", picture.image()?.mime()?),
///         other => println!("{:?} #{}", other.kind(), other.id()),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub enum Shape {
    AutoShape(AutoShape),
    Picture(Picture),
    Line(Line),
    Table(Table),
    Chart(Chart),
    Group(GroupShape),
    Media(MediaShape),
    Ole(OleObject),
}

impl Shape {
    /// Properties shared by every variant.
    pub fn base(&self) -> &BaseShape {
        match self {
            Shape::AutoShape(s) => s.base(),
            Shape::Picture(s) => s.base(),
            Shape::Line(s) => s.base(),
            Shape::Table(s) => s.base(),
            Shape::Chart(s) => s.base(),
            Shape::Group(s) => s.base(),
            Shape::Media(s) => s.base(),
            Shape::Ole(s) => s.base(),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::AutoShape(_) => ShapeKind::AutoShape,
            Shape::Picture(_) => ShapeKind::Picture,
            Shape::Line(_) => ShapeKind::Line,
            Shape::Table(_) => ShapeKind::Table,
            Shape::Chart(_) => ShapeKind::Chart,
            Shape::Group(_) => ShapeKind::Group,
            Shape::Media(_) => ShapeKind::Media,
            Shape::Ole(_) => ShapeKind::Ole,
        }
    }

    pub(crate) fn element(&self) -> &XmlElement {
        self.base().element()
    }

    pub fn id(&self) -> u32 {
        self.base().id()
    }

    pub fn name(&self) -> String {
        self.base().name()
    }

    pub fn set_name(&self, name: &str) -> Result<()> {
        self.base().set_name(name)
    }

    pub fn x(&self) -> f64 {
        self.base().x()
    }

    pub fn y(&self) -> f64 {
        self.base().y()
    }

    pub fn width(&self) -> f64 {
        self.base().width()
    }

    pub fn height(&self) -> f64 {
        self.base().height()
    }

    pub fn set_x(&self, px: f64) -> Result<()> {
        self.base().set_x(px)
    }

    pub fn set_y(&self, px: f64) -> Result<()> {
        self.base().set_y(px)
    }

    pub fn set_width(&self, px: f64) -> Result<()> {
        self.base().set_width(px)
    }

    pub fn set_height(&self, px: f64) -> Result<()> {
        self.base().set_height(px)
    }

    pub fn geometry_type(&self) -> Geometry {
        self.base().geometry_type()
    }

    /// Whether [`SlideShapes::remove`] accepts this shape.
    ///
    /// Charts and OLE objects own parts this crate does not manage.
    pub fn is_removable(&self) -> bool {
        !matches!(self.kind(), ShapeKind::Chart | ShapeKind::Ole)
    }

    /// Whether [`SlideShapes::add`] can copy this shape.
    pub fn is_copyable(&self) -> bool {
        !matches!(self.kind(), ShapeKind::Chart | ShapeKind::Ole)
    }

    pub fn as_auto_shape(&self) -> Option<&AutoShape> {
        match self {
            Shape::AutoShape(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_picture(&self) -> Option<&Picture> {
        match self {
            Shape::Picture(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&Line> {
        match self {
            Shape::Line(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Shape::Table(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_chart(&self) -> Option<&Chart> {
        match self {
            Shape::Chart(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupShape> {
        match self {
            Shape::Group(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_media(&self) -> Option<&MediaShape> {
        match self {
            Shape::Media(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ole(&self) -> Option<&OleObject> {
        match self {
            Shape::Ole(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::ooxml::opc::constants::content_type as ct;
    use crate::ooxml::opc::package::OpcPackage;
    use crate::ooxml::opc::packuri::PackURI;
    use crate::ooxml::opc::part::XmlPart;
    use crate::ooxml::pptx::document::{Document, DocumentState, PartContext};
    use crate::ooxml::pptx::options::PresentationOptions;
    use crate::ooxml::pptx::template;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    /// A document holding one empty slide, as a part context.
    pub(crate) fn slide_part() -> PartContext {
        let mut package = OpcPackage::new();
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        package.add_part(Box::new(XmlPart::new(
            slide.clone(),
            ct::PML_SLIDE.to_string(),
            template::empty_slide_xml().as_bytes().to_vec(),
        )));
        Document::new(DocumentState::new(package, PresentationOptions::default())).part(slide)
    }

    /// Route `tracing` output to the test harness, filtered by `RUST_LOG`.
    pub(crate) fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// A solid-color PNG; different `tag` values give different bytes.
    pub(crate) fn png_bytes(width: u32, height: u32, tag: u8) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([tag, 0x40, 0x80, 0xFF]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }
}
