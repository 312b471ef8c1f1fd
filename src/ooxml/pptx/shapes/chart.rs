//! Charts embedded in graphic frames.
//!
//! The chart itself lives in its own part (`c:chartSpace`); the slide only holds
//! the frame and a relationship id. Charts are read-only here.
use crate::common::xml::XmlElement;
use crate::common::{Error, Result};
use crate::ooxml::pptx::document::PartContext;
use crate::ooxml::pptx::shapes::base::BaseShape;

/// Plot type of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartType {
    Area,
    Area3D,
    Bar,
    Bar3D,
    Bubble,
    Doughnut,
    Line,
    Line3D,
    OfPie,
    Pie,
    Pie3D,
    Radar,
    Scatter,
    Stock,
    Surface,
    Surface3D,
    /// More than one plot type in the same plot area
    Combination,
}

impl ChartType {
    /// Plot type of a `c:plotArea` child such as `c:barChart`.
    pub fn from_plot_name(local_name: &str) -> Option<Self> {
        Some(match local_name {
            "areaChart" => ChartType::Area,
            "area3DChart" => ChartType::Area3D,
            "barChart" => ChartType::Bar,
            "bar3DChart" => ChartType::Bar3D,
            "bubbleChart" => ChartType::Bubble,
            "doughnutChart" => ChartType::Doughnut,
            "lineChart" => ChartType::Line,
            "line3DChart" => ChartType::Line3D,
            "ofPieChart" => ChartType::OfPie,
            "pieChart" => ChartType::Pie,
            "pie3DChart" => ChartType::Pie3D,
            "radarChart" => ChartType::Radar,
            "scatterChart" => ChartType::Scatter,
            "stockChart" => ChartType::Stock,
            "surfaceChart" => ChartType::Surface,
            "surface3DChart" => ChartType::Surface3D,
            _ => return None,
        })
    }

    /// Whether data points are positioned by value rather than by category.
    pub fn has_categories(&self) -> bool {
        !matches!(self, ChartType::Scatter | ChartType::Bubble)
    }
}

/// Layout of a new bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarChartType {
    /// Horizontal bars side by side
    ClusteredBar,
    /// Vertical bars side by side
    #[default]
    ClusteredColumn,
    StackedBar,
    StackedColumn,
}

impl BarChartType {
    /// `c:barDir` value.
    pub(crate) fn direction(&self) -> &'static str {
        match self {
            BarChartType::ClusteredBar | BarChartType::StackedBar => "bar",
            BarChartType::ClusteredColumn | BarChartType::StackedColumn => "col",
        }
    }

    /// `c:grouping` value.
    pub(crate) fn grouping(&self) -> &'static str {
        match self {
            BarChartType::ClusteredBar | BarChartType::ClusteredColumn => "clustered",
            BarChartType::StackedBar | BarChartType::StackedColumn => "stacked",
        }
    }
}

/// Plot elements of a plot area (`c:*Chart` children).
pub(crate) fn plots(plot_area: &XmlElement) -> Vec<XmlElement> {
    plot_area
        .children()
        .into_iter()
        .filter(|c| c.local_name().ends_with("Chart"))
        .collect()
}

/// One category of a category-based chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    /// Enclosing category of a multi-level axis
    pub main: Option<String>,
}

/// A chart shape.
#[derive(Debug, Clone)]
pub struct Chart {
    base: BaseShape,
    chart_part: PartContext,
}

impl Chart {
    pub(crate) fn new(base: BaseShape, chart_part: PartContext) -> Self {
        Self { base, chart_part }
    }

    #[inline]
    pub fn base(&self) -> &BaseShape {
        &self.base
    }

    fn chart(&self) -> Result<XmlElement> {
        self.chart_part
            .dom()?
            .child("chart")
            .ok_or_else(|| Error::MalformedInput("chart part has no chart".to_string()))
    }

    fn plot_area(&self) -> Result<XmlElement> {
        self.chart()?
            .child("plotArea")
            .ok_or_else(|| Error::MalformedInput("chart has no plot area".to_string()))
    }

    pub fn chart_type(&self) -> Result<ChartType> {
        let plots = plots(&self.plot_area()?);
        match plots.as_slice() {
            [single] => ChartType::from_plot_name(&single.local_name()).ok_or_else(|| {
                Error::UnsupportedOperation(format!("unknown plot type {}", single.name()))
            }),
            [] => Err(Error::MalformedInput("chart has no plot".to_string())),
            _ => Ok(ChartType::Combination),
        }
    }

    pub fn is_combination(&self) -> Result<bool> {
        Ok(plots(&self.plot_area()?).len() > 1)
    }

    /// Number of series across every plot.
    pub fn series_count(&self) -> Result<usize> {
        Ok(plots(&self.plot_area()?)
            .iter()
            .map(|plot| plot.children_named("ser").len())
            .sum())
    }

    /// Categories of the first series, `None` for scatter and bubble charts.
    pub fn categories(&self) -> Result<Option<Vec<Category>>> {
        let plots = plots(&self.plot_area()?);
        if let [single] = plots.as_slice() {
            let plot_type = ChartType::from_plot_name(&single.local_name());
            if plot_type.is_some_and(|t| !t.has_categories()) {
                return Ok(None);
            }
        }

        let Some(cat) = plots
            .iter()
            .flat_map(|plot| plot.children_named("ser"))
            .find_map(|ser| ser.child("cat"))
        else {
            return Ok(Some(Vec::new()));
        };
        Ok(Some(read_categories(&cat)))
    }

    /// Title text, when the chart has one.
    pub fn title(&self) -> Result<Option<String>> {
        let chart = self.chart()?;
        let Some(tx) = chart.path(&["title", "tx"]) else {
            return Ok(None);
        };
        if let Some(rich) = tx.child("rich") {
            let text = rich
                .children_named("p")
                .iter()
                .map(|p| {
                    p.descendants()
                        .iter()
                        .filter(|e| e.is("t"))
                        .map(|t| t.text())
                        .collect::<String>()
                })
                .collect::<Vec<_>>()
                .join("\n");
            return Ok(Some(text));
        }
        Ok(tx
            .first_descendant("strCache")
            .map(|cache| cache_values(&cache).join(" ")))
    }
}

/// Category labels of a `c:cat` element, from whichever cache it carries.
fn read_categories(cat: &XmlElement) -> Vec<Category> {
    if let Some(cache) = cat.first_descendant("multiLvlStrCache") {
        return read_multi_level(&cache);
    }

    let cache = ["strCache", "numCache", "strLit", "numLit"]
        .iter()
        .find_map(|name| cat.first_descendant(name));
    cache
        .map(|cache| {
            cache_values(&cache)
                .into_iter()
                .map(|name| Category { name, main: None })
                .collect()
        })
        .unwrap_or_default()
}

/// Leaf categories of a multi-level cache, each tagged with the label of the
/// next level up. A parent point applies from its index until the next one.
fn read_multi_level(cache: &XmlElement) -> Vec<Category> {
    let levels = cache.children_named("lvl");
    let Some(leaves) = levels.first() else {
        return Vec::new();
    };
    let parents = levels.get(1).map(indexed_points).unwrap_or_default();

    indexed_points(leaves)
        .into_iter()
        .map(|(idx, name)| Category {
            name,
            main: parents
                .iter()
                .rev()
                .find(|(parent_idx, _)| *parent_idx <= idx)
                .map(|(_, label)| label.clone()),
        })
        .collect()
}

/// `(idx, value)` of every `c:pt`, sorted by index.
fn indexed_points(container: &XmlElement) -> Vec<(u32, String)> {
    let mut points: Vec<(u32, String)> = container
        .children_named("pt")
        .into_iter()
        .map(|pt| {
            let idx = pt
                .attr("idx")
                .and_then(|v| atoi_simd::parse::<u32, false, false>(v.as_bytes()).ok())
                .unwrap_or(0);
            let value = pt.child("v").map(|v| v.text()).unwrap_or_default();
            (idx, value)
        })
        .collect();
    points.sort_by_key(|(idx, _)| *idx);
    points
}

fn cache_values(cache: &XmlElement) -> Vec<String> {
    indexed_points(cache).into_iter().map(|(_, v)| v).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(inner: &str) -> XmlElement {
        XmlElement::parse(&format!(r#"<c:cat xmlns:c="c">{}</c:cat>"#, inner)).unwrap()
    }

    #[test]
    fn test_plot_names() {
        assert_eq!(ChartType::from_plot_name("barChart"), Some(ChartType::Bar));
        assert_eq!(ChartType::from_plot_name("pie3DChart"), Some(ChartType::Pie3D));
        assert_eq!(ChartType::from_plot_name("valAx"), None);
        assert!(!ChartType::Scatter.has_categories());
        assert!(ChartType::Line.has_categories());
    }

    #[test]
    fn test_string_cache_categories_in_index_order() {
        let categories = read_categories(&cat(
            r#"<c:strRef><c:f>Sheet1!$A$2:$A$3</c:f><c:strCache><c:ptCount val="2"/><c:pt idx="1"><c:v>East</c:v></c:pt><c:pt idx="0"><c:v>West</c:v></c:pt></c:strCache></c:strRef>"#,
        ));
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["West", "East"]);
        assert!(categories.iter().all(|c| c.main.is_none()));
    }

    #[test]
    fn test_numeric_categories() {
        let categories = read_categories(&cat(
            r#"<c:numRef><c:numCache><c:pt idx="0"><c:v>2023</c:v></c:pt><c:pt idx="1"><c:v>2024</c:v></c:pt></c:numCache></c:numRef>"#,
        ));
        assert_eq!(categories[1].name, "2024");
    }

    #[test]
    fn test_multi_level_categories() {
        let categories = read_categories(&cat(
            r#"<c:multiLvlStrRef><c:multiLvlStrCache><c:ptCount val="3"/>
                <c:lvl><c:pt idx="0"><c:v>Jan</c:v></c:pt><c:pt idx="1"><c:v>Feb</c:v></c:pt><c:pt idx="2"><c:v>Jan</c:v></c:pt></c:lvl>
                <c:lvl><c:pt idx="0"><c:v>2023</c:v></c:pt><c:pt idx="2"><c:v>2024</c:v></c:pt></c:lvl>
            </c:multiLvlStrCache></c:multiLvlStrRef>"#,
        ));
        assert_eq!(
            categories,
            vec![
                Category { name: "Jan".into(), main: Some("2023".into()) },
                Category { name: "Feb".into(), main: Some("2023".into()) },
                Category { name: "Jan".into(), main: Some("2024".into()) },
            ]
        );
    }
}
