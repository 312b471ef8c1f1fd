/// Open Packaging Conventions (OPC) implementation.
///
/// A `.pptx` file is a ZIP archive of parts linked by relationships. This
/// module reads that structure into memory, lets callers add and rewrite parts,
/// and writes it back out.
///
/// - `memchr` for counting relationship references in part XML
/// - `atoi_simd` for parsing `rIdN` and partname indexes
/// - `quick-xml` for the content types and `.rels` parts
/// - `zip` for the physical container

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

// Re-export commonly used types
pub use error::OpcError;
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::{BlobPart, Part, XmlPart};
pub use rel::{Relationship, Relationships};
