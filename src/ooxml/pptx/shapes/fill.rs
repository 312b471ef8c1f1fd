//! Shape fill (the fill choice inside `p:spPr`).
use crate::common::Result;
use crate::common::xml::XmlElement;
use crate::ooxml::pptx::shapes::outline::{normalize_hex, replace_fill};

/// Kind of fill a shape declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillType {
    NoFill,
    Solid,
    Gradient,
    Picture,
    Pattern,
    /// Inherited from the enclosing group
    Group,
    /// No fill element; the style or theme decides
    Unset,
}

/// Fill view over a shape's `p:spPr`.
#[derive(Debug, Clone)]
pub struct Fill {
    sp_pr: XmlElement,
}

impl Fill {
    pub(crate) fn new(sp_pr: XmlElement) -> Self {
        Self { sp_pr }
    }

    pub fn fill_type(&self) -> FillType {
        for child in self.sp_pr.children() {
            let fill_type = match child.local_name().as_str() {
                "noFill" => FillType::NoFill,
                "solidFill" => FillType::Solid,
                "gradFill" => FillType::Gradient,
                "blipFill" => FillType::Picture,
                "pattFill" => FillType::Pattern,
                "grpFill" => FillType::Group,
                _ => continue,
            };
            return fill_type;
        }
        FillType::Unset
    }

    /// RGB color of a solid fill.
    pub fn hex_color(&self) -> Option<String> {
        self.sp_pr.path(&["solidFill", "srgbClr"])?.attr("val")
    }

    pub fn set_solid_color(&self, hex: &str) -> Result<()> {
        let hex = normalize_hex(hex)?;
        let solid = XmlElement::new("a:solidFill");
        solid.append(&XmlElement::with_attrs("a:srgbClr", &[("val", hex.as_str())]));
        replace_fill(&self.sp_pr, &solid, |_, fill| self.insert_fill(fill))
    }

    pub fn set_no_fill(&self) -> Result<()> {
        let no_fill = XmlElement::new("a:noFill");
        replace_fill(&self.sp_pr, &no_fill, |_, fill| self.insert_fill(fill))
    }

    /// Place a fill after the geometry, keeping schema order.
    fn insert_fill(&self, fill: &XmlElement) -> Result<()> {
        let anchor = self
            .sp_pr
            .child("prstGeom")
            .or_else(|| self.sp_pr.child("custGeom"))
            .or_else(|| self.sp_pr.child("xfrm"));
        match anchor {
            Some(anchor) => anchor.insert_after(fill),
            None => {
                self.sp_pr.prepend(fill);
                Ok(())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp_pr(inner: &str) -> XmlElement {
        XmlElement::parse(&format!(r#"<p:spPr xmlns:p="p" xmlns:a="a">{}</p:spPr>"#, inner)).unwrap()
    }

    fn child_names(element: &XmlElement) -> Vec<String> {
        element.children().iter().map(|c| c.local_name()).collect()
    }

    #[test]
    fn test_fill_type() {
        assert_eq!(Fill::new(sp_pr("<a:xfrm/>")).fill_type(), FillType::Unset);
        assert_eq!(
            Fill::new(sp_pr("<a:xfrm/><a:gradFill/>")).fill_type(),
            FillType::Gradient
        );
    }

    #[test]
    fn test_solid_fill_after_geometry() {
        let element = sp_pr("<a:xfrm/><a:prstGeom/><a:ln/>");
        let fill = Fill::new(element.clone());
        fill.set_solid_color("00FF00").unwrap();

        assert_eq!(child_names(&element), ["xfrm", "prstGeom", "solidFill", "ln"]);
        assert_eq!(fill.fill_type(), FillType::Solid);
        assert_eq!(fill.hex_color().as_deref(), Some("00FF00"));
    }

    #[test]
    fn test_no_fill_replaces_solid() {
        let element = sp_pr(r#"<a:xfrm/><a:prstGeom/><a:solidFill><a:srgbClr val="123456"/></a:solidFill><a:ln/>"#);
        let fill = Fill::new(element.clone());
        fill.set_no_fill().unwrap();

        assert_eq!(child_names(&element), ["xfrm", "prstGeom", "noFill", "ln"]);
        assert_eq!(fill.hex_color(), None);
    }
}
