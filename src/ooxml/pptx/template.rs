//! Presentation and shape templates.
//!
//! Provides the minimal parts of a new presentation and the shape-tree
//! fragments that new shapes are instantiated from. Fragments are written
//! without namespace declarations and parsed inside a wrapper that declares
//! the `a:`, `p:` and `r:` prefixes, so they can be spliced straight into a
//! slide's shape tree.

use crate::common::xml::{XmlElement, escape_xml};
use crate::common::{Error, Result};
use crate::ooxml::opc::constants::namespace as ns;
use crate::ooxml::pptx::format::MediaType;
use crate::ooxml::pptx::shapes::BarChartType;
use std::fmt::Write as FmtWrite;

/// Presentation part with a slide master reference and an empty slide list.
pub fn default_presentation_xml() -> &'static str {
    include_str!("resources/presentation.xml")
}

/// Slide master with a single blank layout.
pub fn default_slide_master_xml() -> &'static str {
    include_str!("resources/slideMaster.xml")
}

/// Blank slide layout.
pub fn default_slide_layout_xml() -> &'static str {
    include_str!("resources/slideLayout.xml")
}

/// Office theme with the standard color and font schemes.
pub fn default_theme_xml() -> &'static str {
    include_str!("resources/theme.xml")
}

/// Slide with an empty shape tree.
pub fn empty_slide_xml() -> &'static str {
    include_str!("resources/slide.xml")
}

/// Parse a shape-tree fragment into a detached element.
pub fn parse_fragment(xml: &str) -> Result<XmlElement> {
    let wrapped = format!(
        r#"<fragment xmlns:a="{}" xmlns:p="{}" xmlns:r="{}">{}</fragment>"#,
        ns::DML_MAIN,
        ns::PML_MAIN,
        ns::OFC_RELATIONSHIPS,
        xml
    );
    let root = XmlElement::parse(&wrapped)?;
    let element = root
        .first_child()
        .ok_or_else(|| Error::XmlError("empty shape fragment".to_string()))?;
    element.remove();
    Ok(element)
}

/// `p:sp` with a rectangle geometry, no outline and one empty paragraph.
pub fn autoshape() -> Result<XmlElement> {
    parse_fragment(include_str!("resources/autoshape.xml"))
}

/// `p:cxnSp` straight connector.
pub fn line() -> Result<XmlElement> {
    parse_fragment(include_str!("resources/line.xml"))
}

/// `p:pic` referencing `embed_r_id`, with an optional SVG blip extension.
///
/// Offset and extents start at zero and are set by the caller.
pub fn picture(id: u32, name: &str, embed_r_id: &str, svg_r_id: Option<&str>) -> Result<XmlElement> {
    let mut xml = String::with_capacity(1024);

    xml.push_str("<p:pic><p:nvPicPr>");
    write!(xml, r#"<p:cNvPr id="{}" name="{}"/>"#, id, escape_xml(name))?;
    xml.push_str("<p:cNvPicPr/><p:nvPr/></p:nvPicPr>");

    xml.push_str("<p:blipFill>");
    match svg_r_id {
        Some(svg_r_id) => {
            write!(xml, r#"<a:blip r:embed="{}"><a:extLst>"#, embed_r_id)?;
            write!(
                xml,
                r#"<a:ext uri="{{28A0092B-C50C-407E-A947-70E740481C1C}}"><a14:useLocalDpi xmlns:a14="{}" val="0"/></a:ext>"#,
                ns::A14
            )?;
            write!(
                xml,
                r#"<a:ext uri="{{96DAC541-7B7A-43D3-8B79-37D633B846F1}}"><asvg:svgBlip xmlns:asvg="{}" r:embed="{}"/></a:ext>"#,
                ns::ASVG,
                svg_r_id
            )?;
            xml.push_str("</a:extLst></a:blip>");
        },
        None => {
            write!(xml, r#"<a:blip r:embed="{}"/>"#, embed_r_id)?;
        },
    }
    xml.push_str("<a:stretch><a:fillRect/></a:stretch></p:blipFill>");

    xml.push_str(r#"<p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></a:xfrm>"#);
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#);
    xml.push_str("</p:pic>");

    parse_fragment(&xml)
}

/// Relationship ids a media picture refers to.
#[derive(Debug, Clone, Copy)]
pub struct MediaRefs<'a> {
    /// Preview image (`a:blip/@r:embed`)
    pub preview: &'a str,
    /// Legacy audio/video link (`a:audioFile/@r:link`)
    pub link: &'a str,
    /// PowerPoint 2010 media reference (`p14:media/@r:embed`)
    pub media: &'a str,
}

/// `p:pic` for an audio or video clip with a `ppaction://media` click action.
pub fn media_picture(
    id: u32,
    name: &str,
    media_type: MediaType,
    refs: MediaRefs<'_>,
) -> Result<XmlElement> {
    let mut xml = String::with_capacity(1536);

    xml.push_str("<p:pic><p:nvPicPr>");
    write!(xml, r#"<p:cNvPr id="{}" name="{}">"#, id, escape_xml(name))?;
    xml.push_str(r#"<a:hlinkClick r:id="" action="ppaction://media"/></p:cNvPr>"#);
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>"#);

    xml.push_str("<p:nvPr>");
    write!(
        xml,
        r#"<a:{} r:link="{}"/>"#,
        media_type.element_local_name(),
        refs.link
    )?;
    xml.push_str(r#"<p:extLst><p:ext uri="{DAA4B4D4-6D71-4841-9C94-3DE7FCFB9230}">"#);
    write!(xml, r#"<p14:media xmlns:p14="{}" r:embed="{}"/>"#, ns::P14, refs.media)?;
    xml.push_str("</p:ext></p:extLst></p:nvPr></p:nvPicPr>");

    write!(
        xml,
        r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
        refs.preview
    )?;

    xml.push_str(r#"<p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></a:xfrm>"#);
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#);
    xml.push_str("</p:pic>");

    parse_fragment(&xml)
}

/// `p:graphicFrame` holding an `a:tbl` with `columns` equal-width columns.
pub fn table(
    id: u32,
    name: &str,
    style_id: &str,
    column_width: i64,
    columns: usize,
    row_height: i64,
    rows: usize,
) -> Result<XmlElement> {
    let mut xml = String::with_capacity(1024 + rows * columns * 128);

    xml.push_str("<p:graphicFrame><p:nvGraphicFramePr>");
    write!(xml, r#"<p:cNvPr id="{}" name="{}"/>"#, id, escape_xml(name))?;
    xml.push_str(r#"<p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr>"#);
    xml.push_str("<p:nvPr/></p:nvGraphicFramePr>");
    xml.push_str(r#"<p:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></p:xfrm>"#);

    write!(xml, r#"<a:graphic><a:graphicData uri="{}"><a:tbl>"#, ns::DML_TABLE)?;
    write!(
        xml,
        r#"<a:tblPr firstRow="1" bandRow="1"><a:tableStyleId>{}</a:tableStyleId></a:tblPr>"#,
        escape_xml(style_id)
    )?;

    xml.push_str("<a:tblGrid>");
    for _ in 0..columns {
        write!(xml, r#"<a:gridCol w="{}"/>"#, column_width)?;
    }
    xml.push_str("</a:tblGrid>");

    for _ in 0..rows {
        write!(xml, r#"<a:tr h="{}">"#, row_height)?;
        for _ in 0..columns {
            xml.push_str(r#"<a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></a:txBody><a:tcPr/></a:tc>"#);
        }
        xml.push_str("</a:tr>");
    }

    xml.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");

    parse_fragment(&xml)
}

/// `p:sp` standing in for a layout placeholder; the caller appends the
/// `p:ph` element to `p:nvSpPr/p:nvPr`.
pub fn placeholder(id: u32, name: &str, with_text: bool) -> Result<XmlElement> {
    let mut xml = String::with_capacity(512);

    xml.push_str("<p:sp><p:nvSpPr>");
    write!(xml, r#"<p:cNvPr id="{}" name="{}"/>"#, id, escape_xml(name))?;
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr/></p:nvSpPr><p:spPr/>"#);
    if with_text {
        xml.push_str(r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody>"#);
    }
    xml.push_str("</p:sp>");

    parse_fragment(&xml)
}

/// `p:graphicFrame` showing the chart part behind `chart_r_id`.
pub fn chart_frame(id: u32, name: &str, chart_r_id: &str) -> Result<XmlElement> {
    let mut xml = String::with_capacity(768);

    xml.push_str("<p:graphicFrame><p:nvGraphicFramePr>");
    write!(xml, r#"<p:cNvPr id="{}" name="{}"/>"#, id, escape_xml(name))?;
    xml.push_str(r#"<p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr>"#);
    xml.push_str("<p:nvPr/></p:nvGraphicFramePr>");
    xml.push_str(r#"<p:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></p:xfrm>"#);
    write!(
        xml,
        r#"<a:graphic><a:graphicData uri="{}"><c:chart xmlns:c="{}" r:id="{}"/></a:graphicData></a:graphic>"#,
        ns::DML_CHART,
        ns::DML_CHART,
        chart_r_id
    )?;
    xml.push_str("</p:graphicFrame>");

    parse_fragment(&xml)
}

/// Chart part with a single-series bar plot over literal `(category, value)`
/// points.
pub fn bar_chart_space(chart_type: BarChartType, data: &[(&str, f64)]) -> Result<String> {
    const CAT_AX_ID: u32 = 500_000_001;
    const VAL_AX_ID: u32 = 500_000_002;
    let count = data.len();
    let mut xml = String::with_capacity(2048 + count * 96);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<c:chartSpace xmlns:c="{}" xmlns:a="{}" xmlns:r="{}">"#,
        ns::DML_CHART,
        ns::DML_MAIN,
        ns::OFC_RELATIONSHIPS
    )?;
    xml.push_str(r#"<c:roundedCorners val="0"/><c:chart><c:autoTitleDeleted val="1"/><c:plotArea><c:layout/>"#);

    write!(
        xml,
        r#"<c:barChart><c:barDir val="{}"/><c:grouping val="{}"/><c:varyColors val="0"/>"#,
        chart_type.direction(),
        chart_type.grouping()
    )?;
    xml.push_str(r#"<c:ser><c:idx val="0"/><c:order val="0"/><c:tx><c:v>Series 1</c:v></c:tx>"#);
    xml.push_str(r#"<c:invertIfNegative val="0"/>"#);

    write!(xml, r#"<c:cat><c:strLit><c:ptCount val="{}"/>"#, count)?;
    for (idx, (category, _)) in data.iter().enumerate() {
        write!(xml, r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#, idx, escape_xml(category))?;
    }
    xml.push_str("</c:strLit></c:cat>");

    write!(
        xml,
        r#"<c:val><c:numLit><c:formatCode>General</c:formatCode><c:ptCount val="{}"/>"#,
        count
    )?;
    for (idx, (_, value)) in data.iter().enumerate() {
        write!(xml, r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#, idx, value)?;
    }
    xml.push_str("</c:numLit></c:val></c:ser>");

    xml.push_str(r#"<c:gapWidth val="150"/>"#);
    if chart_type.grouping() == "stacked" {
        xml.push_str(r#"<c:overlap val="100"/>"#);
    }
    write!(xml, r#"<c:axId val="{}"/><c:axId val="{}"/></c:barChart>"#, CAT_AX_ID, VAL_AX_ID)?;

    // Categories run along the left edge for horizontal bars
    let (cat_pos, val_pos) = match chart_type.direction() {
        "bar" => ("l", "b"),
        _ => ("b", "l"),
    };
    for (tag, id, pos, cross) in [
        ("catAx", CAT_AX_ID, cat_pos, VAL_AX_ID),
        ("valAx", VAL_AX_ID, val_pos, CAT_AX_ID),
    ] {
        write!(
            xml,
            r#"<c:{tag}><c:axId val="{id}"/><c:scaling><c:orientation val="minMax"/></c:scaling><c:delete val="0"/><c:axPos val="{pos}"/><c:crossAx val="{cross}"/></c:{tag}>"#,
        )?;
    }

    xml.push_str(r#"</c:plotArea><c:plotVisOnly val="1"/></c:chart></c:chartSpace>"#);
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resources_parse() {
        for xml in [
            default_presentation_xml(),
            default_slide_master_xml(),
            default_slide_layout_xml(),
            default_theme_xml(),
            empty_slide_xml(),
        ] {
            XmlElement::parse(xml).unwrap();
        }
    }

    #[test]
    fn test_fragment_is_detached() {
        let sp = autoshape().unwrap();
        assert_eq!(sp.name(), "p:sp");
        assert!(sp.parent().is_none());
        assert!(sp.path(&["txBody", "p"]).is_some());
        assert_eq!(line().unwrap().name(), "p:cxnSp");
    }

    #[test]
    fn test_svg_picture_has_both_blips() {
        let pic = picture(4, "Picture 4", "rId2", Some("rId3")).unwrap();
        let blip = pic.path(&["blipFill", "blip"]).unwrap();
        assert_eq!(blip.attr("r:embed").as_deref(), Some("rId2"));
        let svg_blip = blip.first_descendant("svgBlip").unwrap();
        assert_eq!(svg_blip.attr("r:embed").as_deref(), Some("rId3"));
        assert!(blip.first_descendant("useLocalDpi").is_some());
    }

    #[test]
    fn test_media_picture_shape() {
        let refs = MediaRefs {
            preview: "rId1",
            link: "rId2",
            media: "rId3",
        };
        let pic = media_picture(2, "Audio 2", MediaType::Audio, refs).unwrap();
        let nv_pr = pic.path(&["nvPicPr", "nvPr"]).unwrap();
        assert_eq!(nv_pr.first_child().unwrap().local_name(), "audioFile");
        let hlink = pic.path(&["nvPicPr", "cNvPr", "hlinkClick"]).unwrap();
        assert_eq!(hlink.attr("action").as_deref(), Some("ppaction://media"));
        assert_eq!(
            pic.first_descendant("media").unwrap().attr("r:embed").as_deref(),
            Some("rId3")
        );
    }

    #[test]
    fn test_bar_chart_space() {
        let xml = bar_chart_space(BarChartType::StackedBar, &[("Q1", 1.5), ("Q2 & Q3", 4.0)]).unwrap();
        let space = XmlElement::parse(&xml).unwrap();
        let bar = space.path(&["chart", "plotArea", "barChart"]).unwrap();
        assert_eq!(bar.child("barDir").unwrap().attr("val").as_deref(), Some("bar"));
        assert_eq!(bar.child("grouping").unwrap().attr("val").as_deref(), Some("stacked"));
        assert!(bar.child("overlap").is_some());

        let points = bar.path(&["ser", "cat", "strLit"]).unwrap().children_named("pt");
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].child("v").unwrap().text(), "Q2 & Q3");
        let values = bar.path(&["ser", "val", "numLit"]).unwrap().children_named("pt");
        assert_eq!(values[0].child("v").unwrap().text(), "1.5");
    }

    #[test]
    fn test_placeholder_shape() {
        let sp = placeholder(3, "Title 1", true).unwrap();
        assert!(sp.path(&["nvSpPr", "nvPr"]).unwrap().children().is_empty());
        assert!(sp.path(&["txBody", "p"]).is_some());
        assert!(placeholder(4, "Picture 2", false).unwrap().child("txBody").is_none());
    }

    #[test]
    fn test_table_grid() {
        let frame = table(1, "Table 1", "{X}", 100, 3, 50, 2).unwrap();
        let tbl = frame.first_descendant("tbl").unwrap();
        assert_eq!(tbl.path(&["tblGrid"]).unwrap().children().len(), 3);
        assert_eq!(tbl.children_named("tr").len(), 2);
        assert_eq!(tbl.children_named("tr")[0].children_named("tc").len(), 3);
    }
}
