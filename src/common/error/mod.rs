//! Unified error types for Longan.
//!
//! This module provides a unified error type that encompasses packaging, XML and
//! shape-tree errors, presenting a consistent API to users.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
