//! PowerPoint (.pptx) presentation support.
//!
//! A [`Presentation`] owns one OPC package. Its slides expose their shape trees
//! as [`SlideShapes`], a list of typed [`Shape`] values that read from and
//! write to the slide XML in place. Layouts and masters expose the same shapes
//! read-only.
//!
//! # Example
//!
//! ```rust,no_run
//! use longan::ooxml::pptx::{Presentation, Shape};
//!
//! let pres = Presentation::open("deck.pptx")?;
//! let shapes = pres.slide(1)?.shapes()?;
//! for shape in shapes.iter() {
//!     if let Shape::Table(table) = &shape {
//!         println!("{} is a {}x{} table", shape.name(), table.row_count(), table.column_count());
//!     }
//! }
//! # Ok::<(), longan::common::Error>(())
//! ```
pub(crate) mod document;
pub mod format;
pub mod imaging;
pub mod media;
pub mod options;
pub mod presentation;
pub mod shapes;
pub mod slide;
pub mod template;

pub use format::{ImageFormat, MediaFormat, MediaType};
pub use media::{MediaCollection, MediaStream};
pub use options::PresentationOptions;
pub use presentation::Presentation;
pub use shapes::{
    AutoShape, BarChartType, BaseShape, Category, Chart, ChartType, CroppingFrame, Fill, FillType,
    Geometry, GroupShape, Image, Line, LineFrame, MediaShape, OleObject, Outline, Paragraph,
    Picture, Point, Shape, ShapeCollection, ShapeGeometry, ShapeKind, SlideShapes, Table,
    TableCell, TableColumn, TableRow, TextBox,
};
pub use slide::{Slide, SlideLayout, SlideMaster};
