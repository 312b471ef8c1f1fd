//! Text body of a shape or table cell (`p:txBody` / `a:txBody`).
use crate::common::unit::{cm_to_emu, emu_to_cm};
use crate::common::xml::XmlElement;
use crate::common::{Error, Result};

/// Character a line break (`a:br`) reads back as.
pub const LINE_BREAK: char = '\u{000B}';

/// Default left and right inset, in centimeters.
const DEFAULT_HORIZONTAL_MARGIN_CM: f64 = 0.25;
/// Default top and bottom inset, in centimeters.
const DEFAULT_VERTICAL_MARGIN_CM: f64 = 0.13;

/// The text of a shape, organized as paragraphs.
///
/// Paragraphs read back joined with `\n`; line breaks inside a paragraph read
/// back as a vertical tab.
///
/// # Examples
///
/// ```rust,ignore
/// if let Some(text_box) = auto_shape.text_box() {
///     text_box.set_text("Title\nSubtitle")?;
///     assert_eq!(text_box.paragraphs().len(), 2);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TextBox {
    tx_body: XmlElement,
}

impl TextBox {
    pub(crate) fn new(tx_body: XmlElement) -> Self {
        Self { tx_body }
    }

    pub fn paragraphs(&self) -> Vec<Paragraph> {
        self.tx_body
            .children_named("p")
            .into_iter()
            .map(Paragraph::new)
            .collect()
    }

    pub fn text(&self) -> String {
        self.paragraphs()
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace all text, one paragraph per line.
    ///
    /// Paragraph and run properties of the first paragraph carry over to
    /// every new paragraph.
    pub fn set_text(&self, text: &str) -> Result<()> {
        let template = self.paragraphs().into_iter().next();
        self.tx_body.remove_children("p");

        for line in text.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let paragraph = match &template {
                Some(template) => template.blank_copy()?,
                None => Paragraph::new(XmlElement::new("a:p")),
            };
            self.tx_body.append(&paragraph.element);
            paragraph.set_text(line)?;
        }
        Ok(())
    }

    /// Append an empty paragraph shaped like the last one.
    pub fn add_paragraph(&self) -> Result<Paragraph> {
        let paragraph = match self.paragraphs().last() {
            Some(last) => last.blank_copy()?,
            None => Paragraph::new(XmlElement::new("a:p")),
        };
        self.tx_body.append(&paragraph.element);
        Ok(paragraph)
    }

    fn body_pr(&self) -> Option<XmlElement> {
        self.tx_body.child("bodyPr")
    }

    fn margin(&self, attr: &str, default: f64) -> f64 {
        match self.body_pr().and_then(|b| b.attr_i64(attr)) {
            Some(emu) => (emu_to_cm(emu) * 100.0).round() / 100.0,
            None => default,
        }
    }

    fn set_margin(&self, attr: &str, cm: f64) -> Result<()> {
        let body_pr = self
            .body_pr()
            .ok_or_else(|| Error::MalformedInput("no body properties".to_string()))?;
        body_pr.set_attr(attr, itoa::Buffer::new().format(cm_to_emu(cm)));
        Ok(())
    }

    /// Left inset in centimeters.
    pub fn left_margin(&self) -> f64 {
        self.margin("lIns", DEFAULT_HORIZONTAL_MARGIN_CM)
    }

    pub fn right_margin(&self) -> f64 {
        self.margin("rIns", DEFAULT_HORIZONTAL_MARGIN_CM)
    }

    pub fn top_margin(&self) -> f64 {
        self.margin("tIns", DEFAULT_VERTICAL_MARGIN_CM)
    }

    pub fn bottom_margin(&self) -> f64 {
        self.margin("bIns", DEFAULT_VERTICAL_MARGIN_CM)
    }

    pub fn set_left_margin(&self, cm: f64) -> Result<()> {
        self.set_margin("lIns", cm)
    }

    pub fn set_right_margin(&self, cm: f64) -> Result<()> {
        self.set_margin("rIns", cm)
    }

    pub fn set_top_margin(&self, cm: f64) -> Result<()> {
        self.set_margin("tIns", cm)
    }

    pub fn set_bottom_margin(&self, cm: f64) -> Result<()> {
        self.set_margin("bIns", cm)
    }

    pub fn is_text_wrapped(&self) -> bool {
        self.body_pr()
            .and_then(|b| b.attr("wrap"))
            .is_none_or(|wrap| wrap != "none")
    }

    pub fn set_text_wrapped(&self, wrapped: bool) -> Result<()> {
        let body_pr = self
            .body_pr()
            .ok_or_else(|| Error::MalformedInput("no body properties".to_string()))?;
        body_pr.set_attr("wrap", if wrapped { "square" } else { "none" });
        Ok(())
    }
}

/// One paragraph (`a:p`).
#[derive(Debug, Clone)]
pub struct Paragraph {
    element: XmlElement,
}

impl Paragraph {
    fn new(element: XmlElement) -> Self {
        Self { element }
    }

    pub fn text(&self) -> String {
        let mut text = String::new();
        for child in self.element.children() {
            match child.local_name().as_str() {
                "r" | "fld" => {
                    if let Some(t) = child.child("t") {
                        text.push_str(&t.text());
                    }
                },
                "br" => text.push(LINE_BREAK),
                _ => {},
            }
        }
        text
    }

    /// Replace the runs with `text`, keeping the first run's formatting.
    ///
    /// Vertical tabs become line breaks.
    pub fn set_text(&self, text: &str) -> Result<()> {
        let run_props = self
            .element
            .child("r")
            .and_then(|r| r.child("rPr"))
            .map(|rpr| rpr.deep_clone());
        for name in ["r", "br", "fld"] {
            self.element.remove_children(name);
        }

        let end = self.element.child("endParaRPr");
        for (i, segment) in text.split(LINE_BREAK).enumerate() {
            if i > 0 {
                let br = XmlElement::new("a:br");
                if let Some(rpr) = &run_props {
                    br.append(&rpr.deep_clone());
                }
                self.insert_content(&br, end.as_ref())?;
            }
            if segment.is_empty() {
                continue;
            }
            let run = XmlElement::new("a:r");
            if let Some(rpr) = &run_props {
                run.append(&rpr.deep_clone());
            }
            let t = XmlElement::new("a:t");
            t.set_text(segment);
            run.append(&t);
            self.insert_content(&run, end.as_ref())?;
        }
        Ok(())
    }

    fn insert_content(&self, node: &XmlElement, end: Option<&XmlElement>) -> Result<()> {
        match end {
            Some(end) => end.insert_before(node),
            None => {
                self.element.append(node);
                Ok(())
            },
        }
    }

    /// Empty paragraph with the same paragraph and run properties.
    fn blank_copy(&self) -> Result<Paragraph> {
        let copy = XmlElement::new(&self.element.name());
        for child in self.element.children() {
            if matches!(child.local_name().as_str(), "pPr" | "endParaRPr") {
                copy.append(&child.deep_clone());
            }
        }
        if let Some(r) = self.element.child("r") {
            // Keep one empty run so set_text can pick its formatting up
            let run = XmlElement::new(&r.name());
            if let Some(rpr) = r.child("rPr") {
                run.append(&rpr.deep_clone());
            }
            run.append(&XmlElement::new("a:t"));
            match copy.child("endParaRPr") {
                Some(end) => end.insert_before(&run)?,
                None => copy.append(&run),
            }
        }
        Ok(Paragraph::new(copy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(paragraphs: &str) -> (TextBox, XmlElement) {
        let tx_body = XmlElement::parse(&format!(
            r#"<p:txBody xmlns:p="p" xmlns:a="a"><a:bodyPr/><a:lstStyle/>{}</p:txBody>"#,
            paragraphs
        ))
        .unwrap();
        (TextBox::new(tx_body.clone()), tx_body)
    }

    #[test]
    fn test_text_joins_paragraphs_and_breaks() {
        let (tb, _) = text_box(
            r#"<a:p><a:r><a:t>Hello </a:t></a:r><a:r><a:t>world</a:t></a:r></a:p><a:p><a:r><a:t>a</a:t></a:r><a:br/><a:fld type="slidenum"><a:t>3</a:t></a:fld></a:p>"#,
        );
        assert_eq!(tb.text(), "Hello world\na\u{000B}3");
        assert_eq!(tb.paragraphs().len(), 2);
    }

    #[test]
    fn test_set_text_keeps_formatting() {
        let (tb, tx_body) = text_box(
            r#"<a:p><a:pPr algn="ctr"/><a:r><a:rPr b="1"/><a:t>old</a:t></a:r><a:endParaRPr lang="en-US"/></a:p>"#,
        );
        tb.set_text("one\ntwo").unwrap();

        assert_eq!(tb.text(), "one\ntwo");
        let paragraphs = tx_body.children_named("p");
        assert_eq!(paragraphs.len(), 2);
        for p in &paragraphs {
            assert_eq!(p.child("pPr").unwrap().attr("algn").as_deref(), Some("ctr"));
            assert_eq!(p.path(&["r", "rPr"]).unwrap().attr("b").as_deref(), Some("1"));
            assert_eq!(p.children().last().unwrap().local_name(), "endParaRPr");
        }
    }

    #[test]
    fn test_set_text_with_line_break() {
        let (tb, tx_body) = text_box("<a:p/>");
        tb.set_text("a\u{000B}b").unwrap();
        let p = tx_body.child("p").unwrap();
        let names: Vec<String> = p.children().iter().map(|c| c.local_name()).collect();
        assert_eq!(names, ["r", "br", "r"]);
        assert_eq!(tb.text(), "a\u{000B}b");
    }

    #[test]
    fn test_empty_text_leaves_one_paragraph() {
        let (tb, _) = text_box(r#"<a:p><a:r><a:t>x</a:t></a:r></a:p><a:p/>"#);
        tb.set_text("").unwrap();
        assert_eq!(tb.paragraphs().len(), 1);
        assert_eq!(tb.text(), "");
    }

    #[test]
    fn test_add_paragraph() {
        let (tb, _) = text_box(r#"<a:p><a:r><a:t>x</a:t></a:r></a:p>"#);
        let p = tb.add_paragraph().unwrap();
        p.set_text("y").unwrap();
        assert_eq!(tb.text(), "x\ny");
    }

    #[test]
    fn test_margins_and_wrap() {
        let (tb, _) = text_box("<a:p/>");
        assert_eq!(tb.left_margin(), 0.25);
        assert_eq!(tb.top_margin(), 0.13);
        assert!(tb.is_text_wrapped());

        tb.set_left_margin(1.0).unwrap();
        assert_eq!(tb.left_margin(), 1.0);
        tb.set_text_wrapped(false).unwrap();
        assert!(!tb.is_text_wrapped());
    }
}
