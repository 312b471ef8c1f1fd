//! AutoShapes (`p:sp`): preset or custom geometry, optionally with text.
use crate::ooxml::pptx::shapes::base::BaseShape;
use crate::ooxml::pptx::shapes::textframe::TextBox;

/// A `p:sp` shape.
///
/// Geometry, outline and fill are reached through [`BaseShape`]. Shapes
/// without a text body (connectors drawn as `p:sp`, some placeholders) have
/// no text box.
#[derive(Debug, Clone)]
pub struct AutoShape {
    base: BaseShape,
}

impl AutoShape {
    pub(crate) fn new(base: BaseShape) -> Self {
        Self { base }
    }

    #[inline]
    pub fn base(&self) -> &BaseShape {
        &self.base
    }

    pub fn text_box(&self) -> Option<TextBox> {
        self.base.element().child("txBody").map(TextBox::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::geometry::Geometry;
    use crate::ooxml::pptx::shapes::test_support::slide_part;
    use crate::ooxml::pptx::template;

    #[test]
    fn test_template_shape() {
        let shape = AutoShape::new(BaseShape::new(slide_part(), template::autoshape().unwrap()));
        let text_box = shape.text_box().unwrap();
        assert_eq!(text_box.paragraphs().len(), 1);
        assert_eq!(text_box.text(), "");
        assert_eq!(shape.base().geometry_type(), Geometry::Rectangle);
        assert_eq!(shape.base().outline().unwrap().hex_color(), None);
    }

    #[test]
    fn test_shape_without_text_body() {
        let sp = template::parse_fragment(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="4" name="Arrow"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>"#,
        )
        .unwrap();
        let shape = AutoShape::new(BaseShape::new(slide_part(), sp));
        assert!(shape.text_box().is_none());
    }
}
