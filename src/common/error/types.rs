//! Unified error types for Longan.
//!
//! Read paths over the shape tree are lenient and simply skip what they cannot
//! classify; write paths are strict and report one of the variants below.
use thiserror::Error;

/// Main error type for Longan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required element or attribute is missing from a shape being edited
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The operation is not supported for this kind of shape
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Shape, slide or part not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bytes could not be decoded as a raster or vector image
    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    /// Scanning shape names took longer than the configured budget
    #[error("Name matching exceeded its time budget of {0:?}")]
    MatchTimeout(std::time::Duration),

    /// Invalid file format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// Packaging error that has no closer match above
    #[error("Package error: {0}")]
    Package(String),
}

/// Result type for Longan operations.
pub type Result<T> = std::result::Result<T, Error>;
