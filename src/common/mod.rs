//! Common types and utilities shared across the crate.
//!
//! This module holds the error type, unit conversions and the shared XML tree
//! that the presentation layer edits in place.

// Submodule declarations
pub mod error;
pub mod unit;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
pub use unit::Dpi;
