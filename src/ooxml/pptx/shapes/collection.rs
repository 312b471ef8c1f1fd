//! Classification of a shape tree into typed shapes.
//!
//! Every read walks the tree again; nothing is cached between calls. Elements
//! that cannot be classified are skipped and logged at debug level.
use crate::common::xml::XmlElement;
use crate::common::{Error, Result};
use crate::ooxml::opc::constants::namespace as ns;
use crate::ooxml::pptx::document::PartContext;
use crate::ooxml::pptx::format::MediaType;
use crate::ooxml::pptx::shapes::autoshape::AutoShape;
use crate::ooxml::pptx::shapes::base::BaseShape;
use crate::ooxml::pptx::shapes::chart::{self, Chart};
use crate::ooxml::pptx::shapes::group::GroupShape;
use crate::ooxml::pptx::shapes::line::Line;
use crate::ooxml::pptx::shapes::media_shape::MediaShape;
use crate::ooxml::pptx::shapes::naming;
use crate::ooxml::pptx::shapes::ole::OleObject;
use crate::ooxml::pptx::shapes::picture::Picture;
use crate::ooxml::pptx::shapes::table::Table;
use crate::ooxml::pptx::shapes::Shape;

/// Read-only view of the shapes of one shape tree, in z-order.
///
/// # Examples
///
/// ```rust,ignore
/// let shapes = slide.layout()?.shapes()?;
/// for shape in shapes.iter() {
///     println!("{} #{}", shape.name(), shape.id());
/// }
/// let title = shapes.get_by_name("Title 1")?;
/// ```
#[derive(Debug, Clone)]
pub struct ShapeCollection {
    part: PartContext,
    tree: XmlElement,
}

impl ShapeCollection {
    pub(crate) fn new(part: PartContext, tree: XmlElement) -> Self {
        Self { part, tree }
    }

    pub(crate) fn part(&self) -> &PartContext {
        &self.part
    }

    pub(crate) fn tree(&self) -> &XmlElement {
        &self.tree
    }

    /// Classify every element of the tree.
    pub fn shapes(&self) -> Vec<Shape> {
        naming::shape_elements(&self.tree)
            .into_iter()
            .filter_map(|element| self.classify(element))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Shape> + use<> {
        self.shapes().into_iter()
    }

    pub fn len(&self) -> usize {
        self.shapes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape at zero-based `index` in z-order.
    pub fn get(&self, index: usize) -> Option<Shape> {
        self.shapes().into_iter().nth(index)
    }

    /// Topmost shape.
    pub fn last(&self) -> Option<Shape> {
        self.shapes().pop()
    }

    pub fn try_get_by_id(&self, id: u32) -> Option<Shape> {
        self.iter().find(|shape| shape.id() == id)
    }

    pub fn get_by_id(&self, id: u32) -> Result<Shape> {
        self.try_get_by_id(id)
            .ok_or_else(|| Error::NotFound(format!("shape with id {}", id)))
    }

    pub fn try_get_by_name(&self, name: &str) -> Option<Shape> {
        self.iter().find(|shape| shape.name() == name)
    }

    pub fn get_by_name(&self, name: &str) -> Result<Shape> {
        self.try_get_by_name(name)
            .ok_or_else(|| Error::NotFound(format!("shape named {:?}", name)))
    }

    fn base(&self, element: &XmlElement) -> BaseShape {
        BaseShape::new(self.part.clone(), element.clone())
    }

    fn classify(&self, element: XmlElement) -> Option<Shape> {
        match element.local_name().as_str() {
            "grpSp" => Some(Shape::Group(GroupShape::new(self.base(&element)))),
            "cxnSp" => Some(Shape::Line(Line::new(self.base(&element)))),
            "sp" => Some(Shape::AutoShape(AutoShape::new(self.base(&element)))),
            "graphicFrame" => self.classify_frame(element),
            "pic" => self.classify_picture(element),
            other => {
                tracing::debug!(element = other, "skipping unrecognized shape-tree element");
                None
            },
        }
    }

    fn classify_frame(&self, frame: XmlElement) -> Option<Shape> {
        let graphic_data = frame.path(&["graphic", "graphicData"])?;
        let uri = graphic_data.attr("uri").unwrap_or_default();

        if uri == ns::PML_OLE {
            return Some(Shape::Ole(OleObject::new(self.base(&frame))));
        }

        if let Some(pic) = graphic_data.first_descendant("pic") {
            if !has_blip_embed(&pic) {
                tracing::debug!(id = self.base(&frame).id(), "skipping frame picture without image");
                return None;
            }
            return Some(Shape::Picture(Picture::new(self.base(&frame), pic)));
        }

        match uri.as_str() {
            ns::DML_CHART => self.classify_chart(frame, &graphic_data),
            ns::DML_TABLE => Some(Shape::Table(Table::new(self.base(&frame)))),
            _ => {
                tracing::debug!(uri = %uri, "skipping graphic frame with unknown content");
                None
            },
        }
    }

    fn classify_chart(&self, frame: XmlElement, graphic_data: &XmlElement) -> Option<Shape> {
        let resolved = graphic_data
            .child("chart")
            .and_then(|c| c.attr("r:id"))
            .ok_or_else(|| Error::MalformedInput("chart frame has no relationship".to_string()))
            .and_then(|r_id| self.part.related_part(&r_id));

        let chart_part = match resolved {
            Ok(part) => part,
            Err(e) => {
                tracing::debug!(error = %e, "skipping chart that cannot be resolved");
                return None;
            },
        };

        let plot_count = chart_part
            .dom()
            .ok()
            .and_then(|dom| dom.path(&["chart", "plotArea"]))
            .map(|plot_area| chart::plots(&plot_area).len())
            .unwrap_or(0);
        if plot_count == 0 {
            tracing::debug!(part = %chart_part.partname(), "skipping chart without plots");
            return None;
        }

        Some(Shape::Chart(Chart::new(self.base(&frame), chart_part)))
    }

    fn classify_picture(&self, pic: XmlElement) -> Option<Shape> {
        let media_type = pic
            .path(&["nvPicPr", "nvPr"])
            .and_then(|nv_pr| nv_pr.first_child())
            .and_then(|first| match first.local_name().as_str() {
                "audioFile" => Some(MediaType::Audio),
                "videoFile" => Some(MediaType::Video),
                _ => None,
            });
        if let Some(media_type) = media_type {
            return Some(Shape::Media(MediaShape::new(self.base(&pic), media_type)));
        }

        if !has_blip_embed(&pic) {
            tracing::debug!(id = self.base(&pic).id(), "skipping picture without image");
            return None;
        }
        Some(Shape::Picture(Picture::new(self.base(&pic), pic)))
    }
}

fn has_blip_embed(pic: &XmlElement) -> bool {
    pic.path(&["blipFill", "blip"])
        .is_some_and(|blip| blip.has_attr("r:embed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
    use crate::ooxml::opc::packuri::PackURI;
    use crate::ooxml::opc::part::XmlPart;
    use crate::ooxml::pptx::shapes::ShapeKind;
    use crate::ooxml::pptx::shapes::chart::ChartType;
    use crate::ooxml::pptx::shapes::test_support::slide_part;
    use crate::ooxml::pptx::template;

    fn add_chart_part(part: &PartContext, plots: &str) -> String {
        let partname = PackURI::new("/ppt/charts/chart1.xml").unwrap();
        let xml = format!(
            r#"<c:chartSpace xmlns:c="{}"><c:chart><c:plotArea><c:layout/>{}<c:catAx/></c:plotArea></c:chart></c:chartSpace>"#,
            ns::DML_CHART,
            plots
        );
        part.document()
            .borrow_mut()
            .package_mut()
            .add_part(Box::new(XmlPart::new(
                partname.clone(),
                ct::DML_CHART.to_string(),
                xml.into_bytes(),
            )));
        part.relate_to(&partname, rt::CHART).unwrap()
    }

    fn chart_frame(r_id: &str) -> XmlElement {
        template::parse_fragment(&format!(
            r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="5" name="Chart 1"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm/><a:graphic><a:graphicData uri="{}"><c:chart xmlns:c="{}" r:id="{}"/></a:graphicData></a:graphic></p:graphicFrame>"#,
            ns::DML_CHART,
            ns::DML_CHART,
            r_id
        ))
        .unwrap()
    }

    #[test]
    fn test_classifies_in_tree_order() {
        let part = slide_part();
        let tree = part.shape_tree().unwrap();
        tree.append(&template::line().unwrap());
        tree.append(&template::autoshape().unwrap());
        tree.append(&template::table(3, "Table 1", "{S}", 100, 2, 100, 2).unwrap());
        tree.append(&template::picture(4, "Picture 4", "rId9", None).unwrap());
        tree.append(&XmlElement::new("p:contentPart"));

        let kinds: Vec<ShapeKind> = ShapeCollection::new(part, tree).iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            [ShapeKind::Line, ShapeKind::AutoShape, ShapeKind::Table, ShapeKind::Picture]
        );
    }

    #[test]
    fn test_pictures_without_image_are_skipped() {
        let part = slide_part();
        let tree = part.shape_tree().unwrap();
        let pic = template::picture(2, "Picture 2", "rId1", None).unwrap();
        pic.path(&["blipFill", "blip"]).unwrap().remove_attr("r:embed");
        tree.append(&pic);

        let collection = ShapeCollection::new(part, tree);
        assert!(collection.is_empty());
    }

    #[test]
    fn test_media_pictures() {
        let part = slide_part();
        let tree = part.shape_tree().unwrap();
        let refs = template::MediaRefs {
            preview: "rId1",
            link: "rId2",
            media: "rId3",
        };
        tree.append(&template::media_picture(2, "Video2", MediaType::Video, refs).unwrap());

        let shape = ShapeCollection::new(part, tree).last().unwrap();
        assert_eq!(shape.as_media().unwrap().media_type(), MediaType::Video);
    }

    #[test]
    fn test_charts_by_plot_count() {
        let part = slide_part();
        let tree = part.shape_tree().unwrap();
        let r_id = add_chart_part(&part, "<c:barChart><c:ser/></c:barChart><c:lineChart/>");
        tree.append(&chart_frame(&r_id));

        let collection = ShapeCollection::new(part, tree);
        let shape = collection.get_by_name("Chart 1").unwrap();
        let chart = shape.as_chart().unwrap();
        assert!(chart.is_combination().unwrap());
        assert_eq!(chart.chart_type().unwrap(), ChartType::Combination);
        assert!(!shape.is_removable());
    }

    #[test]
    fn test_scatter_chart_has_no_categories() {
        let part = slide_part();
        let tree = part.shape_tree().unwrap();
        let r_id = add_chart_part(&part, "<c:scatterChart/>");
        tree.append(&chart_frame(&r_id));

        let shape = ShapeCollection::new(part, tree).get(0).unwrap();
        assert_eq!(shape.as_chart().unwrap().categories().unwrap(), None);
    }

    #[test]
    fn test_unresolvable_or_empty_charts_are_skipped() {
        let part = slide_part();
        let tree = part.shape_tree().unwrap();
        tree.append(&chart_frame("rId42"));
        let r_id = add_chart_part(&part, "");
        tree.append(&chart_frame(&r_id));

        assert_eq!(ShapeCollection::new(part, tree).len(), 0);
    }

    #[test]
    fn test_ole_and_unknown_frames() {
        let part = slide_part();
        let tree = part.shape_tree().unwrap();
        let frame = |uri: &str, inner: &str| {
            template::parse_fragment(&format!(
                r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="7" name="Object 1"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm/><a:graphic><a:graphicData uri="{}">{}</a:graphicData></a:graphic></p:graphicFrame>"#,
                uri, inner
            ))
            .unwrap()
        };
        tree.append(&frame(ns::PML_OLE, r#"<p:oleObj progId="Excel.Sheet.12" name="Worksheet" r:id="rId3"/>"#));
        tree.append(&frame("urn:unknown", ""));

        let collection = ShapeCollection::new(part, tree);
        assert_eq!(collection.len(), 1);
        let ole = collection.get_by_id(7).unwrap();
        assert_eq!(ole.as_ole().unwrap().prog_id().as_deref(), Some("Excel.Sheet.12"));
        assert!(matches!(collection.get_by_id(8), Err(Error::NotFound(_))));
        assert!(collection.try_get_by_name("missing").is_none());
    }

    #[test]
    fn test_group_exposes_nested_collection() {
        let part = slide_part();
        let tree = part.shape_tree().unwrap();
        let group = template::parse_fragment(
            r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="2" name="Group 1"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:grpSp>"#,
        )
        .unwrap();
        group.append(&template::autoshape().unwrap());
        tree.append(&group);

        let shape = ShapeCollection::new(part, tree).get(0).unwrap();
        let nested = shape.as_group().unwrap().shapes();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested.get(0).unwrap().kind(), ShapeKind::AutoShape);
    }
}
