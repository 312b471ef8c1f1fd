//! Preset geometry of a shape.
use crate::common::xml::XmlElement;
use crate::common::{Error, Result};

/// Preset outline of an AutoShape (`a:prstGeom/@prst`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Geometry {
    Rectangle,
    RoundedRectangle,
    /// Rectangle with its two top corners rounded
    TopCornersRoundedRectangle,
    Ellipse,
    Triangle,
    Diamond,
    Line,
    StraightConnector,
    /// Custom geometry (`a:custGeom`)
    Custom,
    /// Any other preset, by its `prst` value
    Other(String),
}

impl Geometry {
    /// Parse a `prst` attribute value.
    pub fn from_preset(prst: &str) -> Self {
        match prst {
            "rect" => Geometry::Rectangle,
            "roundRect" => Geometry::RoundedRectangle,
            "round2SameRect" => Geometry::TopCornersRoundedRectangle,
            "ellipse" => Geometry::Ellipse,
            "triangle" => Geometry::Triangle,
            "diamond" => Geometry::Diamond,
            "line" => Geometry::Line,
            "straightConnector1" => Geometry::StraightConnector,
            other => Geometry::Other(other.to_string()),
        }
    }

    /// The `prst` value, or `None` for custom geometry.
    pub fn preset(&self) -> Option<&str> {
        Some(match self {
            Geometry::Rectangle => "rect",
            Geometry::RoundedRectangle => "roundRect",
            Geometry::TopCornersRoundedRectangle => "round2SameRect",
            Geometry::Ellipse => "ellipse",
            Geometry::Triangle => "triangle",
            Geometry::Diamond => "diamond",
            Geometry::Line => "line",
            Geometry::StraightConnector => "straightConnector1",
            Geometry::Custom => return None,
            Geometry::Other(prst) => prst.as_str(),
        })
    }

    /// Name given to new shapes of this geometry.
    pub fn name(&self) -> &str {
        match self {
            Geometry::Rectangle => "Rectangle",
            Geometry::RoundedRectangle => "RoundedRectangle",
            Geometry::TopCornersRoundedRectangle => "TopCornersRoundedRectangle",
            Geometry::Ellipse => "Ellipse",
            Geometry::Triangle => "Triangle",
            Geometry::Diamond => "Diamond",
            Geometry::Line => "Line",
            Geometry::StraightConnector => "StraightConnector",
            Geometry::Custom => "Custom",
            Geometry::Other(prst) => prst.as_str(),
        }
    }

    /// Whether the geometry has an adjustable corner radius.
    pub fn is_rounded(&self) -> bool {
        matches!(
            self,
            Geometry::RoundedRectangle | Geometry::TopCornersRoundedRectangle
        )
    }
}

/// Adjust value PowerPoint uses for rounded corners when `avLst` is empty.
const DEFAULT_CORNER_ADJ: f64 = 16667.0;

/// Geometry view over a shape's `p:spPr`.
#[derive(Debug, Clone)]
pub struct ShapeGeometry {
    sp_pr: XmlElement,
}

impl ShapeGeometry {
    pub(crate) fn new(sp_pr: XmlElement) -> Self {
        Self { sp_pr }
    }

    pub fn geometry_type(&self) -> Geometry {
        if self.sp_pr.child("custGeom").is_some() {
            return Geometry::Custom;
        }
        self.sp_pr
            .child("prstGeom")
            .and_then(|g| g.attr("prst"))
            .map(|prst| Geometry::from_preset(&prst))
            .unwrap_or(Geometry::Rectangle)
    }

    /// Replace the preset, dropping any custom geometry and adjust values.
    pub fn set_geometry_type(&self, geometry: Geometry) -> Result<()> {
        let prst = geometry.preset().ok_or_else(|| {
            Error::UnsupportedOperation("custom geometry cannot be assigned".to_string())
        })?;

        let prst_geom = XmlElement::with_attrs("a:prstGeom", &[("prst", prst)]);
        prst_geom.append(&XmlElement::new("a:avLst"));

        match self
            .sp_pr
            .child("prstGeom")
            .or_else(|| self.sp_pr.child("custGeom"))
        {
            Some(existing) => {
                existing.insert_after(&prst_geom)?;
                existing.remove();
            },
            None => match self.sp_pr.child("xfrm") {
                Some(xfrm) => xfrm.insert_after(&prst_geom)?,
                None => self.sp_pr.prepend(&prst_geom),
            },
        }
        Ok(())
    }

    /// Corner size as a percentage of the shorter side's half.
    ///
    /// Only rounded geometries have corners; others report 0.
    pub fn corner_size(&self) -> f64 {
        if !self.geometry_type().is_rounded() {
            return 0.0;
        }
        let adj = self
            .adjust_value()
            .and_then(|gd| gd.attr("fmla"))
            .and_then(|fmla| parse_val_formula(&fmla))
            .unwrap_or(DEFAULT_CORNER_ADJ);
        adj / 50000.0 * 100.0
    }

    pub fn set_corner_size(&self, percent: f64) -> Result<()> {
        if !self.geometry_type().is_rounded() {
            return Err(Error::UnsupportedOperation(
                "corner size applies to rounded rectangles only".to_string(),
            ));
        }
        let prst_geom = self
            .sp_pr
            .child("prstGeom")
            .ok_or_else(|| Error::MalformedInput("no preset geometry".to_string()))?;
        let av_lst = prst_geom.ensure_child("avLst", "a:avLst");

        let adj = (percent / 100.0 * 50000.0).round() as i64;
        let fmla = format!("val {}", adj);
        match self.adjust_value() {
            Some(gd) => gd.set_attr("fmla", &fmla),
            None => av_lst.append(&XmlElement::with_attrs(
                "a:gd",
                &[("name", "adj1"), ("fmla", fmla.as_str())],
            )),
        }
        Ok(())
    }

    /// First adjust value guide (`adj` or `adj1`).
    fn adjust_value(&self) -> Option<XmlElement> {
        self.sp_pr
            .path(&["prstGeom", "avLst"])?
            .children_named("gd")
            .into_iter()
            .find(|gd| matches!(gd.attr("name").as_deref(), Some("adj") | Some("adj1")))
    }
}

/// Parse a `val N` guide formula.
fn parse_val_formula(fmla: &str) -> Option<f64> {
    fmla.strip_prefix("val ")?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp_pr(geometry: &str) -> XmlElement {
        XmlElement::parse(&format!(
            r#"<p:spPr xmlns:p="p" xmlns:a="a"><a:xfrm/>{}</p:spPr>"#,
            geometry
        ))
        .unwrap()
    }

    #[test]
    fn test_preset_round_trip() {
        for geometry in [
            Geometry::Rectangle,
            Geometry::RoundedRectangle,
            Geometry::TopCornersRoundedRectangle,
            Geometry::Ellipse,
        ] {
            assert_eq!(Geometry::from_preset(geometry.preset().unwrap()), geometry);
        }
        assert_eq!(Geometry::from_preset("star5"), Geometry::Other("star5".into()));
        assert_eq!(Geometry::Custom.preset(), None);
    }

    #[test]
    fn test_geometry_type_defaults_to_rectangle() {
        let g = ShapeGeometry::new(sp_pr(""));
        assert_eq!(g.geometry_type(), Geometry::Rectangle);

        let g = ShapeGeometry::new(sp_pr("<a:custGeom/>"));
        assert_eq!(g.geometry_type(), Geometry::Custom);
    }

    #[test]
    fn test_set_geometry_replaces_in_place() {
        let element = sp_pr(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:ln/>"#);
        let g = ShapeGeometry::new(element.clone());
        g.set_geometry_type(Geometry::RoundedRectangle).unwrap();

        let names: Vec<String> = element.children().iter().map(|c| c.local_name()).collect();
        assert_eq!(names, ["xfrm", "prstGeom", "ln"]);
        assert_eq!(g.geometry_type(), Geometry::RoundedRectangle);
    }

    #[test]
    fn test_corner_size() {
        let g = ShapeGeometry::new(sp_pr(r#"<a:prstGeom prst="roundRect"><a:avLst/></a:prstGeom>"#));
        assert!((g.corner_size() - 33.334).abs() < 1e-9);

        g.set_corner_size(50.0).unwrap();
        assert_eq!(g.corner_size(), 50.0);
        g.set_corner_size(10.0).unwrap();
        assert!((g.corner_size() - 10.0).abs() < 1e-9);

        let rect = ShapeGeometry::new(sp_pr(r#"<a:prstGeom prst="rect"/>"#));
        assert_eq!(rect.corner_size(), 0.0);
        assert!(matches!(
            rect.set_corner_size(5.0),
            Err(Error::UnsupportedOperation(_))
        ));
    }
}
