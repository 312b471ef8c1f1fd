//! Base shape implementation shared by every shape variant.
//!
//! A shape is a view over one element of a shape tree (`p:sp`, `p:pic`,
//! `p:cxnSp`, `p:grpSp` or `p:graphicFrame`). Nothing is cached: every
//! accessor reads the element, and every setter writes it in place.
use crate::common::unit::Dpi;
use crate::common::xml::XmlElement;
use crate::common::{Error, Result};
use crate::ooxml::pptx::document::PartContext;
use crate::ooxml::pptx::shapes::fill::Fill;
use crate::ooxml::pptx::shapes::geometry::{Geometry, ShapeGeometry};
use crate::ooxml::pptx::shapes::outline::Outline;

/// Common properties of every shape: identity, position, size and geometry.
///
/// Position and size are in pixels, converted from EMU with the
/// presentation's horizontal and vertical DPI.
///
/// # Examples
///
/// ```rust,ignore
/// let base = shape.base();
/// println!("{} #{} at ({}, {})", base.name(), base.id(), base.x(), base.y());
/// base.set_width(200.0)?;
/// ```
#[derive(Clone)]
pub struct BaseShape {
    part: PartContext,
    element: XmlElement,
}

impl BaseShape {
    pub(crate) fn new(part: PartContext, element: XmlElement) -> Self {
        Self { part, element }
    }

    pub(crate) fn part(&self) -> &PartContext {
        &self.part
    }

    /// The shape-tree element this shape reads and writes.
    pub fn element(&self) -> &XmlElement {
        &self.element
    }

    /// Serialized XML of the shape element.
    pub fn xml(&self) -> String {
        self.element.to_xml()
    }

    /// `cNvPr` inside the shape's non-visual properties.
    fn c_nv_pr(&self) -> Option<XmlElement> {
        self.element.first_child()?.child("cNvPr")
    }

    /// Shape id, unique within its shape tree. 0 when missing.
    pub fn id(&self) -> u32 {
        self.c_nv_pr()
            .and_then(|c| c.attr("id"))
            .and_then(|id| atoi_simd::parse::<u32, false, false>(id.as_bytes()).ok())
            .unwrap_or(0)
    }

    pub(crate) fn set_id(&self, id: u32) -> Result<()> {
        let c_nv_pr = self
            .c_nv_pr()
            .ok_or_else(|| Error::MalformedInput("no non-visual properties".to_string()))?;
        c_nv_pr.set_attr("id", itoa::Buffer::new().format(id));
        Ok(())
    }

    pub fn name(&self) -> String {
        self.c_nv_pr()
            .and_then(|c| c.attr("name"))
            .unwrap_or_default()
    }

    pub fn set_name(&self, name: &str) -> Result<()> {
        let c_nv_pr = self
            .c_nv_pr()
            .ok_or_else(|| Error::MalformedInput("no non-visual properties".to_string()))?;
        c_nv_pr.set_attr("name", name);
        Ok(())
    }

    /// Alternative text (`descr`), if any.
    pub fn alt_text(&self) -> Option<String> {
        self.c_nv_pr().and_then(|c| c.attr("descr"))
    }

    /// Whether the shape is hidden in the slide show.
    pub fn is_hidden(&self) -> bool {
        self.c_nv_pr().is_some_and(|c| c.attr_bool("hidden"))
    }

    /// Whether the shape is a layout placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.element
            .first_child()
            .and_then(|nv| nv.child("nvPr"))
            .and_then(|nv_pr| nv_pr.child("ph"))
            .is_some()
    }

    /// Shape properties (`p:spPr`, or `p:grpSpPr` for groups).
    pub(crate) fn sp_pr(&self) -> Option<XmlElement> {
        self.element
            .child("spPr")
            .or_else(|| self.element.child("grpSpPr"))
    }

    /// The transform holding offset and extents.
    ///
    /// Graphic frames carry it directly as `p:xfrm`; all other shapes inside
    /// their shape properties as `a:xfrm`.
    fn xfrm(&self) -> Option<XmlElement> {
        match self.element.child("xfrm") {
            Some(xfrm) => Some(xfrm),
            None => self.sp_pr()?.child("xfrm"),
        }
    }

    fn ensure_xfrm(&self) -> Result<XmlElement> {
        if let Some(xfrm) = self.xfrm() {
            return Ok(xfrm);
        }
        let sp_pr = self
            .sp_pr()
            .ok_or_else(|| Error::MalformedInput("no shape properties".to_string()))?;
        let xfrm = XmlElement::new("a:xfrm");
        sp_pr.prepend(&xfrm);
        Ok(xfrm)
    }

    fn read_emu(&self, child: &str, attr: &str) -> i64 {
        self.xfrm()
            .and_then(|xfrm| xfrm.child(child))
            .and_then(|e| e.attr_i64(attr))
            .unwrap_or(0)
    }

    fn write_emu(&self, child: &str, attr: &str, value: i64) -> Result<()> {
        let xfrm = self.ensure_xfrm()?;
        let target = match xfrm.child(child) {
            Some(existing) => existing,
            None => {
                let (name, other) = if child == "off" {
                    ("a:off", ["x", "y"])
                } else {
                    ("a:ext", ["cx", "cy"])
                };
                let created = XmlElement::with_attrs(name, &[(other[0], "0"), (other[1], "0")]);
                if child == "off" {
                    xfrm.prepend(&created);
                } else {
                    match xfrm.child("off") {
                        Some(off) => off.insert_after(&created)?,
                        None => xfrm.prepend(&created),
                    }
                }
                created
            },
        };
        target.set_attr(attr, itoa::Buffer::new().format(value));
        Ok(())
    }

    fn dpi(&self) -> Dpi {
        self.part.dpi()
    }

    /// Horizontal offset in EMU.
    pub fn x_emu(&self) -> i64 {
        self.read_emu("off", "x")
    }

    /// Vertical offset in EMU.
    pub fn y_emu(&self) -> i64 {
        self.read_emu("off", "y")
    }

    /// Width in EMU.
    pub fn width_emu(&self) -> i64 {
        self.read_emu("ext", "cx")
    }

    /// Height in EMU.
    pub fn height_emu(&self) -> i64 {
        self.read_emu("ext", "cy")
    }

    pub fn x(&self) -> f64 {
        self.dpi().horizontal_emu_to_px(self.x_emu())
    }

    pub fn y(&self) -> f64 {
        self.dpi().vertical_emu_to_px(self.y_emu())
    }

    pub fn width(&self) -> f64 {
        self.dpi().horizontal_emu_to_px(self.width_emu())
    }

    pub fn height(&self) -> f64 {
        self.dpi().vertical_emu_to_px(self.height_emu())
    }

    pub(crate) fn set_x_emu(&self, emu: i64) -> Result<()> {
        self.write_emu("off", "x", emu)
    }

    pub(crate) fn set_y_emu(&self, emu: i64) -> Result<()> {
        self.write_emu("off", "y", emu)
    }

    pub(crate) fn set_width_emu(&self, emu: i64) -> Result<()> {
        self.write_emu("ext", "cx", emu)
    }

    pub(crate) fn set_height_emu(&self, emu: i64) -> Result<()> {
        self.write_emu("ext", "cy", emu)
    }

    pub fn set_x(&self, px: f64) -> Result<()> {
        self.set_x_emu(self.dpi().horizontal_px_to_emu(px))
    }

    pub fn set_y(&self, px: f64) -> Result<()> {
        self.set_y_emu(self.dpi().vertical_px_to_emu(px))
    }

    pub fn set_width(&self, px: f64) -> Result<()> {
        self.set_width_emu(self.dpi().horizontal_px_to_emu(px))
    }

    pub fn set_height(&self, px: f64) -> Result<()> {
        self.set_height_emu(self.dpi().vertical_px_to_emu(px))
    }

    /// Geometry helper over the shape properties, if the shape has any.
    pub fn geometry(&self) -> Option<ShapeGeometry> {
        self.element.child("spPr").map(ShapeGeometry::new)
    }

    /// Preset outline of the shape; rectangle when unspecified.
    pub fn geometry_type(&self) -> Geometry {
        self.geometry()
            .map(|g| g.geometry_type())
            .unwrap_or(Geometry::Rectangle)
    }

    pub fn set_geometry_type(&self, geometry: Geometry) -> Result<()> {
        self.geometry()
            .ok_or_else(|| Error::MalformedInput("no shape properties".to_string()))?
            .set_geometry_type(geometry)
    }

    /// Corner size of rounded geometries as a percentage.
    pub fn corner_size(&self) -> f64 {
        self.geometry().map(|g| g.corner_size()).unwrap_or(0.0)
    }

    pub fn set_corner_size(&self, percent: f64) -> Result<()> {
        self.geometry()
            .ok_or_else(|| Error::MalformedInput("no shape properties".to_string()))?
            .set_corner_size(percent)
    }

    /// Outline view over the shape properties.
    pub fn outline(&self) -> Option<Outline> {
        self.element.child("spPr").map(Outline::new)
    }

    /// Fill view over the shape properties.
    pub fn fill(&self) -> Option<Fill> {
        self.element.child("spPr").map(Fill::new)
    }

    /// Detach the element from its shape tree.
    pub(crate) fn detach(&self) -> bool {
        self.element.remove()
    }
}

impl std::fmt::Debug for BaseShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseShape")
            .field("element", &self.element.name())
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::test_support::slide_part;
    use crate::ooxml::pptx::template;

    #[test]
    fn test_identity_and_geometry() {
        let part = slide_part();
        let sp = template::autoshape().unwrap();
        let base = BaseShape::new(part, sp);

        base.set_id(7).unwrap();
        base.set_name("Box").unwrap();
        assert_eq!(base.id(), 7);
        assert_eq!(base.name(), "Box");
        assert!(!base.is_placeholder());

        base.set_x(100.0).unwrap();
        base.set_y(50.0).unwrap();
        base.set_width(96.0).unwrap();
        base.set_height(48.0).unwrap();
        assert_eq!(base.x_emu(), 952500);
        assert_eq!(base.width_emu(), 914400);
        assert_eq!(base.x(), 100.0);
        assert_eq!(base.y(), 50.0);
        assert_eq!(base.height(), 48.0);
    }

    #[test]
    fn test_graphic_frame_uses_p_xfrm() {
        let part = slide_part();
        let frame = template::table(3, "Table 1", "{X}", 100, 1, 100, 1).unwrap();
        let base = BaseShape::new(part, frame.clone());
        base.set_x_emu(1234).unwrap();
        assert_eq!(frame.child("xfrm").unwrap().child("off").unwrap().attr("x").as_deref(), Some("1234"));
        assert!(base.outline().is_none());
        assert_eq!(base.geometry_type(), Geometry::Rectangle);
    }

    #[test]
    fn test_missing_transform_is_created() {
        let part = slide_part();
        let sp = template::parse_fragment(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="A"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>"#,
        )
        .unwrap();
        let base = BaseShape::new(part, sp.clone());
        assert_eq!(base.width(), 0.0);
        base.set_width_emu(10).unwrap();
        base.set_x_emu(5).unwrap();
        let xfrm = sp.path(&["spPr", "xfrm"]).unwrap();
        assert_eq!(xfrm.first_child().unwrap().local_name(), "off");
        assert_eq!(base.width_emu(), 10);
        assert_eq!(base.x_emu(), 5);
    }

    #[test]
    fn test_no_shape_properties_is_malformed() {
        let part = slide_part();
        let sp = template::parse_fragment(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="A"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr></p:sp>"#,
        )
        .unwrap();
        let base = BaseShape::new(part, sp);
        assert!(matches!(base.set_x(1.0), Err(Error::MalformedInput(_))));
    }
}
