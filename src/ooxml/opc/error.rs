//! Errors raised while reading, editing or writing a package.
//!
//! These convert into the crate-wide [`Error`](crate::common::Error); callers
//! of the presentation layer never see them directly.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpcError {
    /// No package file at the given path
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    /// A partname that is not absolute or has no file name
    #[error("Invalid pack URI: {0}")]
    InvalidPackUri(String),

    #[error("Part not found: {0}")]
    PartNotFound(String),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    /// A part with neither an override nor a default content type
    #[error("Content type not found for partname: {0}")]
    ContentTypeNotFound(String),

    /// An external relationship where a part was expected, or an ambiguous type lookup
    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    #[error("XML parsing error: {0}")]
    XmlError(String),

    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Quick-XML error: {0}")]
    QuickXmlError(#[from] quick_xml::Error),

    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),

    /// Malformed attribute in `[Content_Types].xml` or a `.rels` part
    #[error("Attribute error: {0}")]
    AttrError(String),
}

impl From<quick_xml::events::attributes::AttrError> for OpcError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OpcError::AttrError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OpcError>;
