//! Longan - a typed, mutable object model for PowerPoint (.pptx) presentations
//!
//! This library opens an Office Open XML presentation package and exposes its
//! slides and shapes as typed objects that read from and write to the
//! underlying XML in place.
//!
//! # Features
//!
//! - **Shape classification**: Every element of a slide's shape tree becomes a
//!   typed [`Shape`](ooxml::pptx::Shape): auto-shape, picture, line, table,
//!   chart, group, media or OLE object
//! - **Mutation**: Add rectangles, lines, tables, pictures, audio and video;
//!   remove shapes; copy shapes between slides and presentations
//! - **Media deduplication**: Byte-identical images and clips share one part
//!   per presentation
//! - **Unit conversion**: Pixel, point and centimeter measurements map onto
//!   English Metric Units at the read/write boundary
//!
//! # Example - Adding shapes to a slide
//!
//! ```no_run
//! use longan::ooxml::pptx::{Geometry, Presentation};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pres = Presentation::new()?;
//! let slide = pres.slide(1)?;
//! let shapes = slide.shapes()?;
//!
//! shapes.add_shape(50.0, 60.0, 100.0, 70.0, Geometry::Rectangle)?;
//! shapes.add_line(10.0, 10.0, 20.0, 5.0)?;
//! shapes.add_table(100.0, 200.0, 3, 2)?;
//!
//! let image = std::fs::read("photo.png")?;
//! shapes.add_picture(&image)?;
//!
//! pres.save("deck.pptx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Reading a presentation
//!
//! ```no_run
//! use longan::ooxml::pptx::{Presentation, Shape};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pres = Presentation::open("deck.pptx")?;
//! for slide in pres.slides()? {
//!     for shape in slide.shapes()?.iter() {
//!         println!("{} #{}: {:?}", shape.name(), shape.id(), shape.kind());
//!         if let Shape::AutoShape(auto) = &shape {
//!             if let Some(text_box) = auto.text_box() {
//!                 println!("  text: {}", text_box.text());
//!             }
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod ooxml;

pub use common::{Error, Result};
pub use ooxml::pptx::{Presentation, PresentationOptions};
