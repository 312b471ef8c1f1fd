//! Objects that implement reading and writing OPC packages.
//!
//! `OpcPackage` holds every part of a package in memory together with the
//! package-level relationships, and is the store the presentation layer reads
//! slides from and adds media parts to.
use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek};
use std::path::Path;
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PackURI, PACKAGE_URI};
use crate::ooxml::opc::part::{Part, PartFactory};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::pkgreader::PackageReader;
use crate::ooxml::opc::pkgwriter::PackageWriter;
use crate::ooxml::opc::rel::Relationships;

/// Main API class for working with OPC packages.
pub struct OpcPackage {
    /// Package-level relationships
    rels: Relationships,

    /// All parts in the package, indexed by partname
    parts: HashMap<String, Box<dyn Part>>,
}

impl OpcPackage {
    /// Create a new empty OPC package.
    pub fn new() -> Self {
        Self {
            rels: Relationships::new(PACKAGE_URI.to_string()),
            parts: HashMap::new(),
        }
    }

    /// Open an OPC package from a file.
    ///
    /// # Example
    /// ```no_run
    /// use longan::ooxml::opc::package::OpcPackage;
    ///
    /// let pkg = OpcPackage::open("deck.pptx").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::unmarshal(PhysPkgReader::open(path)?)
    }

    /// Load an OPC package from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::unmarshal(PhysPkgReader::new(reader)?)
    }

    /// Load an OPC package held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::unmarshal(PhysPkgReader::from_bytes(bytes)?)
    }

    /// Convert serialized parts and relationships into the in-memory graph.
    fn unmarshal(phys_reader: PhysPkgReader) -> Result<Self> {
        let mut pkg_reader = PackageReader::from_phys_reader(phys_reader)?;
        let mut package = Self::new();

        for srel in pkg_reader.pkg_srels() {
            package.rels.add_relationship(
                srel.reltype.clone(),
                srel.target_ref.clone(),
                srel.r_id.clone(),
                srel.is_external(),
            );
        }

        for spart in pkg_reader.take_sparts() {
            let mut part = PartFactory::load(spart.partname, spart.content_type, spart.blob)?;
            for srel in spart.srels {
                let is_external = srel.is_external();
                part.rels_mut().add_relationship(
                    srel.reltype,
                    srel.target_ref,
                    srel.r_id,
                    is_external,
                );
            }
            package.add_part(part);
        }

        tracing::debug!(parts = package.part_count(), "opened package");
        Ok(package)
    }

    /// Write the package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        PackageWriter::write(path, self)
    }

    /// Serialize the package to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self)
    }

    /// Partname of the main document part (`/ppt/presentation.xml`).
    pub fn main_document_partname(&self) -> Result<PackURI> {
        self.rels
            .part_with_reltype(relationship_type::OFFICE_DOCUMENT)?
            .target_partname()
    }

    pub fn get_part(&self, partname: &PackURI) -> Result<&dyn Part> {
        self.parts
            .get(partname.as_str())
            .map(|b| &**b as &dyn Part)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    pub fn get_part_mut(&mut self, partname: &PackURI) -> Result<&mut dyn Part> {
        self.parts
            .get_mut(partname.as_str())
            .map(|b| &mut **b as &mut dyn Part)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Add a part, replacing any part with the same partname.
    pub fn add_part(&mut self, part: Box<dyn Part>) {
        let partname = part.partname().to_string();
        self.parts.insert(partname, part);
    }

    pub fn iter_parts(&self) -> impl Iterator<Item = &dyn Part> {
        self.parts.values().map(|b| &**b as &dyn Part)
    }

    /// Parts a chain of internal relationships leads to from the package.
    pub fn reachable_parts(&self) -> Vec<&dyn Part> {
        let mut seen = HashSet::new();
        let mut pending = internal_targets(&self.rels);
        let mut parts = Vec::with_capacity(self.parts.len());
        while let Some(partname) = pending.pop() {
            if !seen.insert(partname.as_str().to_string()) {
                continue;
            }
            let Ok(part) = self.get_part(&partname) else {
                continue;
            };
            pending.extend(internal_targets(part.rels()));
            parts.push(part);
        }
        parts
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Resolve an internal relationship of `source` to the target partname.
    pub fn related_partname(&self, source: &PackURI, r_id: &str) -> Result<PackURI> {
        self.get_part(source)?
            .rels()
            .get(r_id)
            .ok_or_else(|| OpcError::RelationshipNotFound(format!("{} in {}", r_id, source)))?
            .target_partname()
    }

    /// Find the next available partname for a `%d` template.
    ///
    /// Numbering starts at 1 and takes the first free slot.
    ///
    /// # Example
    /// ```no_run
    /// # use longan::ooxml::opc::package::OpcPackage;
    /// # let pkg = OpcPackage::new();
    /// let next_image = pkg.next_partname("/ppt/media/image%d.png");
    /// ```
    pub fn next_partname(&self, template: &str) -> Result<PackURI> {
        let mut buf = itoa::Buffer::new();
        for n in 1..=u32::MAX {
            let candidate = template.replace("%d", buf.format(n));
            if !self.parts.contains_key(&candidate) {
                return PackURI::new(candidate).map_err(OpcError::InvalidPackUri);
            }
        }
        Err(OpcError::InvalidPackUri(format!(
            "No free partname for template {}",
            template
        )))
    }

    pub fn contains_part(&self, partname: &PackURI) -> bool {
        self.parts.contains_key(partname.as_str())
    }
}

fn internal_targets(rels: &Relationships) -> Vec<PackURI> {
    rels.iter()
        .filter(|rel| !rel.is_external())
        .filter_map(|rel| rel.target_partname().ok())
        .collect()
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;
    use crate::ooxml::opc::part::BlobPart;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn create_minimal_pptx() -> Vec<u8> {
        let mut zip_data = Vec::new();
        {
            let cursor = Cursor::new(&mut zip_data);
            let mut writer = ZipWriter::new(cursor);
            let options = SimpleFileOptions::default();

            writer.start_file("[Content_Types].xml", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Default Extension="png" ContentType="image/png"/>
    <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
    <Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>
</Types>"#).unwrap();

            writer.start_file("_rels/.rels", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#).unwrap();

            writer.start_file("ppt/_rels/presentation.xml.rels", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
</Relationships>"#).unwrap();

            writer.start_file("ppt/presentation.xml", options).unwrap();
            writer.write_all(br#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#).unwrap();

            writer.start_file("ppt/slides/_rels/slide1.xml.rels", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#).unwrap();

            writer.start_file("ppt/slides/slide1.xml", options).unwrap();
            writer.write_all(br#"<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#).unwrap();

            writer.start_file("ppt/media/image1.png", options).unwrap();
            writer.write_all(&[0x89, b'P', b'N', b'G']).unwrap();

            writer.finish().unwrap();
        }
        zip_data
    }

    #[test]
    fn test_open_walks_relationships() {
        let pkg = OpcPackage::from_reader(Cursor::new(create_minimal_pptx())).unwrap();
        assert_eq!(pkg.part_count(), 3);

        let main = pkg.main_document_partname().unwrap();
        assert_eq!(main.as_str(), "/ppt/presentation.xml");
        assert_eq!(pkg.get_part(&main).unwrap().content_type(), ct::PML_PRESENTATION_MAIN);

        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        let image = pkg.related_partname(&slide, "rId1").unwrap();
        assert_eq!(pkg.get_part(&image).unwrap().content_type(), ct::PNG);
        assert!(pkg.related_partname(&slide, "rId2").is_err());
    }

    #[test]
    fn test_round_trip_through_bytes() {
        let mut pkg = OpcPackage::from_bytes(&create_minimal_pptx()).unwrap();
        let partname = pkg.next_partname("/ppt/media/image%d.png").unwrap();
        assert_eq!(partname.as_str(), "/ppt/media/image2.png");
        pkg.add_part(Box::new(BlobPart::new(partname.clone(), ct::PNG.to_string(), vec![1, 2])));
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        pkg.get_part_mut(&slide).unwrap().relate_to(&partname, relationship_type::IMAGE);

        let reopened = OpcPackage::from_bytes(&pkg.to_bytes().unwrap()).unwrap();
        assert_eq!(reopened.part_count(), 4);
        assert_eq!(reopened.get_part(&partname).unwrap().blob(), &[1, 2]);
        let ext = reopened.get_part(&slide).unwrap().rels().get("rId2").unwrap();
        assert!(ext.is_external());
    }

    #[test]
    fn test_unreachable_parts_are_not_written() {
        let mut pkg = OpcPackage::from_bytes(&create_minimal_pptx()).unwrap();
        let orphan = PackURI::new("/ppt/media/image9.png").unwrap();
        pkg.add_part(Box::new(BlobPart::new(orphan, ct::PNG.to_string(), vec![9])));
        assert_eq!(pkg.part_count(), 4);
        assert_eq!(pkg.reachable_parts().len(), 3);

        let bytes = pkg.to_bytes().unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("ppt/media/image1.png").is_ok());
        assert!(archive.by_name("ppt/media/image9.png").is_err());
    }

    #[test]
    fn test_save_to_disk() {
        let pkg = OpcPackage::from_bytes(&create_minimal_pptx()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pptx");
        pkg.save(&path).unwrap();
        assert_eq!(OpcPackage::open(&path).unwrap().part_count(), 3);
    }
}
