//! Office Open XML (OOXML) format implementation.
//!
//! This module provides reading and editing of PowerPoint presentations stored
//! in the Office Open XML format (.pptx).
//!
//! # Architecture
//!
//! The module is organized into two layers:
//!
//! 1. **OPC Layer** (`opc`): Low-level package handling (ZIP, parts, relationships)
//! 2. **Presentation Layer** (`pptx`): Slides, shape trees, media and the
//!    add/remove/copy mutation surface
//!
//! # Example: Listing shapes
//!
//! ```rust,no_run
//! use longan::ooxml::pptx::Presentation;
//!
//! let pres = Presentation::open("deck.pptx")?;
//! let shapes = pres.slide(1)?.shapes()?;
//! println!("Slide 1 has {} shapes", shapes.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod opc;
pub mod pptx;

// Re-export commonly used types from OPC layer
pub use opc::{OpcPackage, PackURI};
