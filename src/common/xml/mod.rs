//! XML helpers shared by the package and shape layers.

pub mod element;
pub mod escape;

pub use element::{XML_DECLARATION, XmlElement, XmlNode};
pub use escape::escape_xml;
