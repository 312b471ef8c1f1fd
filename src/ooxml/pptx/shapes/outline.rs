//! Shape outline (`a:ln`).
use crate::common::unit::{emu_to_pt, pt_to_emu};
use crate::common::xml::XmlElement;
use crate::common::{Error, Result};

/// `spPr` children that must follow `a:ln`.
const AFTER_LN: &[&str] = &["effectLst", "effectDag", "scene3d", "sp3d", "extLst"];

/// Outline view over a shape's `p:spPr`.
#[derive(Debug, Clone)]
pub struct Outline {
    sp_pr: XmlElement,
}

impl Outline {
    pub(crate) fn new(sp_pr: XmlElement) -> Self {
        Self { sp_pr }
    }

    fn ln(&self) -> Option<XmlElement> {
        self.sp_pr.child("ln")
    }

    fn ensure_ln(&self) -> Result<XmlElement> {
        if let Some(ln) = self.ln() {
            return Ok(ln);
        }
        let ln = XmlElement::new("a:ln");
        insert_before_any(&self.sp_pr, &ln, AFTER_LN)?;
        Ok(ln)
    }

    /// Line width in points; 0 when unspecified.
    pub fn weight(&self) -> f64 {
        self.ln()
            .and_then(|ln| ln.attr_i64("w"))
            .map(emu_to_pt)
            .unwrap_or(0.0)
    }

    pub fn set_weight(&self, points: f64) -> Result<()> {
        let ln = self.ensure_ln()?;
        ln.set_attr("w", itoa::Buffer::new().format(pt_to_emu(points)));
        Ok(())
    }

    /// RGB color of a solid outline, `None` for no or theme-colored outline.
    pub fn hex_color(&self) -> Option<String> {
        self.ln()?
            .path(&["solidFill", "srgbClr"])?
            .attr("val")
    }

    /// Make the outline solid with the given `RRGGBB` color.
    pub fn set_hex_color(&self, hex: &str) -> Result<()> {
        let hex = normalize_hex(hex)?;
        let ln = self.ensure_ln()?;
        set_solid_fill(&ln, &hex)?;
        Ok(())
    }
}

/// Validate an `RRGGBB` color, with or without a leading `#`.
pub(crate) fn normalize_hex(hex: &str) -> Result<String> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(hex.to_ascii_uppercase())
    } else {
        Err(Error::MalformedInput(format!("invalid hex color: {}", hex)))
    }
}

/// Replace any fill choice of `parent` with `a:solidFill/a:srgbClr`.
///
/// The new fill takes the position of the old one, or becomes the first
/// child when there was none.
pub(crate) fn set_solid_fill(parent: &XmlElement, hex: &str) -> Result<()> {
    let solid = XmlElement::new("a:solidFill");
    solid.append(&XmlElement::with_attrs("a:srgbClr", &[("val", hex)]));
    replace_fill(parent, &solid, |parent, fill| {
        parent.prepend(fill);
        Ok(())
    })
}

/// Swap the fill choice of `parent` for `fill`, or place it with `insert`.
pub(crate) fn replace_fill(
    parent: &XmlElement,
    fill: &XmlElement,
    insert: impl FnOnce(&XmlElement, &XmlElement) -> Result<()>,
) -> Result<()> {
    let existing = parent.children().into_iter().find(|c| {
        matches!(
            c.local_name().as_str(),
            "noFill" | "solidFill" | "gradFill" | "blipFill" | "pattFill" | "grpFill"
        )
    });
    match existing {
        Some(existing) => {
            existing.insert_before(fill)?;
            existing.remove();
            Ok(())
        },
        None => insert(parent, fill),
    }
}

/// Insert `new` before the first child whose local name is in `followers`,
/// or append it when there is none.
pub(crate) fn insert_before_any(
    parent: &XmlElement,
    new: &XmlElement,
    followers: &[&str],
) -> Result<()> {
    let anchor = parent
        .children()
        .into_iter()
        .find(|c| followers.contains(&c.local_name().as_str()));
    match anchor {
        Some(anchor) => anchor.insert_before(new),
        None => {
            parent.append(new);
            Ok(())
        },
    }
}
