//! Table shape implementation for PowerPoint presentations.
use crate::common::unit::Dpi;
use crate::common::xml::XmlElement;
use crate::common::{Error, Result};
use crate::ooxml::pptx::shapes::base::BaseShape;
use crate::ooxml::pptx::shapes::textframe::TextBox;

/// A table in a PowerPoint presentation.
///
/// Tables in PowerPoint are DrawingML tables (a:tbl) contained within
/// graphic frames. They contain rows, which contain cells.
///
/// # Examples
///
/// ```rust,ignore
/// if let Shape::Table(table) = shape {
///     println!("Table: {}x{}", table.row_count(), table.column_count());
///
///     for (row_idx, row) in table.rows().iter().enumerate() {
///         for (col_idx, cell) in row.cells().iter().enumerate() {
///             println!("Cell[{},{}]: {}", row_idx, col_idx, cell.text());
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Table {
    base: BaseShape,
}

impl Table {
    pub(crate) fn new(base: BaseShape) -> Self {
        Self { base }
    }

    #[inline]
    pub fn base(&self) -> &BaseShape {
        &self.base
    }

    fn tbl(&self) -> Option<XmlElement> {
        self.base
            .element()
            .path(&["graphic", "graphicData", "tbl"])
    }

    fn dpi(&self) -> Dpi {
        self.base.part().dpi()
    }

    pub fn row_count(&self) -> usize {
        self.tbl().map(|t| t.children_named("tr").len()).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.tbl()
            .and_then(|t| t.child("tblGrid"))
            .map(|g| g.children_named("gridCol").len())
            .unwrap_or(0)
    }

    pub fn columns(&self) -> Vec<TableColumn> {
        let dpi = self.dpi();
        self.tbl()
            .and_then(|t| t.child("tblGrid"))
            .map(|grid| {
                grid.children_named("gridCol")
                    .into_iter()
                    .map(|element| TableColumn { element, dpi })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn rows(&self) -> Vec<TableRow> {
        let dpi = self.dpi();
        self.tbl()
            .map(|tbl| {
                tbl.children_named("tr")
                    .into_iter()
                    .map(|element| TableRow { element, dpi })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Cell at zero-based `row_idx` and `col_idx`.
    pub fn cell(&self, row_idx: usize, col_idx: usize) -> Result<TableCell> {
        self.rows()
            .get(row_idx)
            .and_then(|row| row.cells().into_iter().nth(col_idx))
            .ok_or_else(|| Error::NotFound(format!("table cell ({}, {})", row_idx, col_idx)))
    }

    /// Table style GUID, if one is applied.
    pub fn style_id(&self) -> Option<String> {
        self.tbl()?
            .path(&["tblPr", "tableStyleId"])
            .map(|e| e.text())
    }
}

/// A grid column (`a:gridCol`).
#[derive(Debug, Clone)]
pub struct TableColumn {
    element: XmlElement,
    dpi: Dpi,
}

impl TableColumn {
    pub fn width_emu(&self) -> i64 {
        self.element.attr_i64("w").unwrap_or(0)
    }

    /// Width in pixels.
    pub fn width(&self) -> f64 {
        self.dpi.horizontal_emu_to_px(self.width_emu())
    }

    pub fn set_width(&self, px: f64) {
        self.element.set_attr(
            "w",
            itoa::Buffer::new().format(self.dpi.horizontal_px_to_emu(px)),
        );
    }
}

/// A table row (`a:tr`).
#[derive(Debug, Clone)]
pub struct TableRow {
    element: XmlElement,
    dpi: Dpi,
}

impl TableRow {
    pub fn height_emu(&self) -> i64 {
        self.element.attr_i64("h").unwrap_or(0)
    }

    /// Height in pixels.
    pub fn height(&self) -> f64 {
        self.dpi.vertical_emu_to_px(self.height_emu())
    }

    pub fn set_height(&self, px: f64) {
        self.element.set_attr(
            "h",
            itoa::Buffer::new().format(self.dpi.vertical_px_to_emu(px)),
        );
    }

    pub fn cells(&self) -> Vec<TableCell> {
        self.element
            .children_named("tc")
            .into_iter()
            .map(|element| TableCell { element })
            .collect()
    }
}

/// A table cell (`a:tc`).
#[derive(Debug, Clone)]
pub struct TableCell {
    element: XmlElement,
}

impl TableCell {
    pub fn text_box(&self) -> Option<TextBox> {
        self.element.child("txBody").map(TextBox::new)
    }

    pub fn text(&self) -> String {
        self.text_box().map(|t| t.text()).unwrap_or_default()
    }

    pub fn set_text(&self, text: &str) -> Result<()> {
        let text_box = match self.text_box() {
            Some(text_box) => text_box,
            None => {
                let tx_body = XmlElement::new("a:txBody");
                tx_body.append(&XmlElement::new("a:bodyPr"));
                tx_body.append(&XmlElement::new("a:lstStyle"));
                self.element.prepend(&tx_body);
                TextBox::new(tx_body)
            },
        };
        text_box.set_text(text)
    }

    /// Whether this cell is covered by a merge from the left or above.
    pub fn is_merged_away(&self) -> bool {
        self.element.attr_bool("hMerge") || self.element.attr_bool("vMerge")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::test_support::slide_part;
    use crate::ooxml::pptx::template;

    fn table(columns: usize, rows: usize) -> Table {
        let frame = template::table(2, "Table 1", "{S}", 914400, columns, 457200, rows).unwrap();
        Table::new(BaseShape::new(slide_part(), frame))
    }

    #[test]
    fn test_dimensions() {
        let table = table(3, 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns()[0].width(), 96.0);
        assert_eq!(table.rows()[1].height(), 48.0);
        assert_eq!(table.style_id().as_deref(), Some("{S}"));
    }

    #[test]
    fn test_cell_text() {
        let table = table(2, 2);
        let cell = table.cell(1, 1).unwrap();
        assert_eq!(cell.text(), "");
        cell.set_text("Total").unwrap();
        assert_eq!(table.cell(1, 1).unwrap().text(), "Total");
        assert_eq!(table.cell(0, 1).unwrap().text(), "");
        assert!(matches!(table.cell(2, 0), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_resize_column_and_row() {
        let table = table(1, 1);
        table.columns()[0].set_width(48.0);
        table.rows()[0].set_height(24.0);
        assert_eq!(table.columns()[0].width_emu(), 457200);
        assert_eq!(table.rows()[0].height_emu(), 228600);
    }
}
