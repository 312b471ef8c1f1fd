//! Mutable, shared XML element tree.
//!
//! Shape objects are transient views over a part's XML, so the tree has to be
//! shared between every view that points into it and edited in place. Elements
//! are reference-counted handles; cloning an [`XmlElement`] clones the handle,
//! while [`XmlElement::deep_clone`] copies the subtree.
//!
//! Names are kept exactly as written (`p:sp`, `a:off`). Lookups by local name
//! ignore the prefix, which is how shape classification reads the tree.

use crate::common::xml::escape::escape_xml;
use crate::common::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// XML declaration written at the top of every serialized part.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

#[derive(Debug)]
struct ElementData {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<XmlNode>,
    parent: Weak<RefCell<ElementData>>,
}

/// A child of an element: either a nested element or character data.
#[derive(Debug, Clone)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// Handle to an element inside a shared tree.
#[derive(Clone)]
pub struct XmlElement(Rc<RefCell<ElementData>>);

impl XmlElement {
    /// Create a detached element with the given qualified name.
    pub fn new(name: &str) -> Self {
        Self(Rc::new(RefCell::new(ElementData {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
            parent: Weak::new(),
        })))
    }

    /// Create a detached element with attributes.
    pub fn with_attrs(name: &str, attrs: &[(&str, &str)]) -> Self {
        let element = Self::new(name);
        for (key, value) in attrs {
            element.set_attr(key, value);
        }
        element
    }

    /// Parse an XML document and return its root element.
    ///
    /// Whitespace-only text is kept only inside leaf elements, so indentation
    /// between elements does not survive a round trip but `<a:t> </a:t>` does.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    let element = Self::from_start(e)?;
                    stack.push(element);
                },
                Event::Empty(ref e) => {
                    let element = Self::from_start(e)?;
                    match stack.last() {
                        Some(parent) => parent.push_node(XmlNode::Element(element)),
                        None => root = Some(element),
                    }
                },
                Event::End(_) => {
                    let Some(element) = stack.pop() else {
                        return Err(Error::XmlError("unbalanced end tag".to_string()));
                    };
                    element.drop_layout_whitespace();
                    match stack.last() {
                        Some(parent) => parent.push_node(XmlNode::Element(element)),
                        None => root = Some(element),
                    }
                },
                Event::Text(ref t) => {
                    if let Some(current) = stack.last() {
                        current.push_text(std::str::from_utf8(t.as_ref())?);
                    }
                },
                Event::CData(ref c) => {
                    if let Some(current) = stack.last() {
                        current.push_text(std::str::from_utf8(&**c)?);
                    }
                },
                Event::GeneralRef(ref r) => {
                    if let Some(current) = stack.last() {
                        let name = std::str::from_utf8(&**r)?;
                        let resolved = resolve_entity(name).ok_or_else(|| {
                            Error::XmlError(format!("unknown entity reference &{};", name))
                        })?;
                        current.push_text(&resolved);
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }

        if !stack.is_empty() {
            return Err(Error::XmlError("unexpected end of document".to_string()));
        }
        root.ok_or_else(|| Error::XmlError("no root element found".to_string()))
    }

    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let name = std::str::from_utf8(e.name().as_ref())?.to_string();
        let element = Self::new(&name);
        {
            let mut data = element.0.borrow_mut();
            for attr in e.attributes() {
                let attr = attr?;
                let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
                let value = attr.unescape_value()?.into_owned();
                data.attrs.push((key, value));
            }
        }
        Ok(element)
    }

    fn push_node(&self, node: XmlNode) {
        if let XmlNode::Element(ref child) = node {
            child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        }
        self.0.borrow_mut().children.push(node);
    }

    fn push_text(&self, text: &str) {
        let mut data = self.0.borrow_mut();
        if let Some(XmlNode::Text(last)) = data.children.last_mut() {
            last.push_str(text);
        } else {
            data.children.push(XmlNode::Text(text.to_string()));
        }
    }

    fn drop_layout_whitespace(&self) {
        let mut data = self.0.borrow_mut();
        let has_elements = data
            .children
            .iter()
            .any(|n| matches!(n, XmlNode::Element(_)));
        if has_elements {
            data.children
                .retain(|n| !matches!(n, XmlNode::Text(t) if t.trim().is_empty()));
        }
    }

    /// Qualified name as written, e.g. `p:sp`.
    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> String {
        let data = self.0.borrow();
        match data.name.split_once(':') {
            Some((_, local)) => local.to_string(),
            None => data.name.clone(),
        }
    }

    /// Whether the local name equals `local`.
    pub fn is(&self, local: &str) -> bool {
        let data = self.0.borrow();
        local_of(&data.name) == local
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.0
            .borrow()
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.0.borrow().attrs.iter().any(|(k, _)| k == name)
    }

    /// Parse an attribute as an integer, treating absence and junk alike.
    pub fn attr_i64(&self, name: &str) -> Option<i64> {
        self.attr(name).and_then(|v| v.trim().parse().ok())
    }

    /// Boolean attribute in XML Schema form (`1`/`true`).
    pub fn attr_bool(&self, name: &str) -> bool {
        matches!(self.attr(name).as_deref(), Some("1") | Some("true"))
    }

    /// All attributes in document order.
    pub fn attrs(&self) -> Vec<(String, String)> {
        self.0.borrow().attrs.clone()
    }

    /// Set an attribute, keeping its position when it already exists.
    pub fn set_attr(&self, name: &str, value: &str) {
        let mut data = self.0.borrow_mut();
        if let Some(slot) = data.attrs.iter_mut().find(|(k, _)| k == name) {
            slot.1 = value.to_string();
        } else {
            data.attrs.push((name.to_string(), value.to_string()));
        }
    }

    pub fn remove_attr(&self, name: &str) -> Option<String> {
        let mut data = self.0.borrow_mut();
        let pos = data.attrs.iter().position(|(k, _)| k == name)?;
        Some(data.attrs.remove(pos).1)
    }

    /// Element children in document order.
    pub fn children(&self) -> Vec<XmlElement> {
        self.0
            .borrow()
            .children
            .iter()
            .filter_map(|n| match n {
                XmlNode::Element(e) => Some(e.clone()),
                XmlNode::Text(_) => None,
            })
            .collect()
    }

    /// All child nodes, text included.
    pub fn nodes(&self) -> Vec<XmlNode> {
        self.0.borrow().children.clone()
    }

    /// First element child with the given local name.
    pub fn child(&self, local: &str) -> Option<XmlElement> {
        self.0.borrow().children.iter().find_map(|n| match n {
            XmlNode::Element(e) if e.is(local) => Some(e.clone()),
            _ => None,
        })
    }

    /// Every element child with the given local name.
    pub fn children_named(&self, local: &str) -> Vec<XmlElement> {
        self.children()
            .into_iter()
            .filter(|e| e.is(local))
            .collect()
    }

    /// Follow a chain of local names through first matching children.
    pub fn path(&self, locals: &[&str]) -> Option<XmlElement> {
        let mut current = self.clone();
        for local in locals {
            current = current.child(local)?;
        }
        Some(current)
    }

    pub fn first_child(&self) -> Option<XmlElement> {
        self.0.borrow().children.iter().find_map(|n| match n {
            XmlNode::Element(e) => Some(e.clone()),
            XmlNode::Text(_) => None,
        })
    }

    /// Descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Vec<XmlElement> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<XmlElement>) {
        for child in self.children() {
            out.push(child.clone());
            child.collect_descendants(out);
        }
    }

    /// First descendant with the given local name, depth first.
    pub fn first_descendant(&self, local: &str) -> Option<XmlElement> {
        for child in self.children() {
            if child.is(local) {
                return Some(child);
            }
            if let Some(found) = child.first_descendant(local) {
                return Some(found);
            }
        }
        None
    }

    pub fn parent(&self) -> Option<XmlElement> {
        self.0.borrow().parent.upgrade().map(XmlElement)
    }

    /// Append `child` as the last child, detaching it from any previous parent.
    pub fn append(&self, child: &XmlElement) {
        child.remove();
        self.push_node(XmlNode::Element(child.clone()));
    }

    /// Insert `child` as the first element child.
    pub fn prepend(&self, child: &XmlElement) {
        self.insert_node_at(0, child);
    }

    /// Insert `new` immediately after `self` under the same parent.
    pub fn insert_after(&self, new: &XmlElement) -> Result<()> {
        let parent = self
            .parent()
            .ok_or_else(|| Error::MalformedInput("element has no parent".to_string()))?;
        new.remove();
        let idx = parent.node_index(self).map(|i| i + 1).unwrap_or(0);
        parent.insert_node_at(idx, new);
        Ok(())
    }

    /// Insert `new` immediately before `self` under the same parent.
    pub fn insert_before(&self, new: &XmlElement) -> Result<()> {
        let parent = self
            .parent()
            .ok_or_else(|| Error::MalformedInput("element has no parent".to_string()))?;
        new.remove();
        let idx = parent.node_index(self).unwrap_or(0);
        parent.insert_node_at(idx, new);
        Ok(())
    }

    fn insert_node_at(&self, idx: usize, child: &XmlElement) {
        child.remove();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        let mut data = self.0.borrow_mut();
        let idx = idx.min(data.children.len());
        data.children.insert(idx, XmlNode::Element(child.clone()));
    }

    fn node_index(&self, child: &XmlElement) -> Option<usize> {
        self.0
            .borrow()
            .children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if e.ptr_eq(child)))
    }

    /// Detach from the parent. Returns `false` when already detached.
    pub fn remove(&self) -> bool {
        let Some(parent) = self.parent() else {
            return false;
        };
        let idx = parent.node_index(self);
        if let Some(idx) = idx {
            parent.0.borrow_mut().children.remove(idx);
        }
        self.0.borrow_mut().parent = Weak::new();
        idx.is_some()
    }

    /// Remove every element child with the given local name.
    pub fn remove_children(&self, local: &str) {
        for child in self.children_named(local) {
            child.remove();
        }
    }

    /// Remove all children, text included.
    pub fn clear_children(&self) {
        for child in self.children() {
            child.0.borrow_mut().parent = Weak::new();
        }
        self.0.borrow_mut().children.clear();
    }

    /// Return the first child named `local`, creating `name` when missing.
    pub fn ensure_child(&self, local: &str, name: &str) -> XmlElement {
        if let Some(existing) = self.child(local) {
            return existing;
        }
        let created = XmlElement::new(name);
        self.append(&created);
        created
    }

    /// Copy this subtree into a new detached tree.
    pub fn deep_clone(&self) -> XmlElement {
        let data = self.0.borrow();
        let copy = XmlElement::new(&data.name);
        copy.0.borrow_mut().attrs = data.attrs.clone();
        for node in &data.children {
            match node {
                XmlNode::Element(e) => copy.push_node(XmlNode::Element(e.deep_clone())),
                XmlNode::Text(t) => copy.push_node(XmlNode::Text(t.clone())),
            }
        }
        copy
    }

    /// Concatenated character data of this element and its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in self.0.borrow().children.iter() {
            match node {
                XmlNode::Element(e) => e.collect_text(out),
                XmlNode::Text(t) => out.push_str(t),
            }
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text(&self, text: &str) {
        self.clear_children();
        if !text.is_empty() {
            self.0
                .borrow_mut()
                .children
                .push(XmlNode::Text(text.to_string()));
        }
    }

    /// Whether both handles point at the same element.
    #[inline]
    pub fn ptr_eq(&self, other: &XmlElement) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Serialize this subtree without a declaration.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(256);
        self.write_xml(&mut out);
        out
    }

    /// Serialize as a standalone part, declaration first.
    pub fn to_document(&self) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        let data = self.0.borrow();
        out.push('<');
        out.push_str(&data.name);
        for (key, value) in &data.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_xml(value));
            out.push('"');
        }
        if data.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for node in &data.children {
            match node {
                XmlNode::Element(e) => e.write_xml(out),
                XmlNode::Text(t) => out.push_str(&escape_xml(t)),
            }
        }
        out.push_str("</");
        out.push_str(&data.name);
        out.push('>');
    }
}

impl PartialEq for XmlElement {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("XmlElement")
            .field("name", &data.name)
            .field("attrs", &data.attrs)
            .field("children", &data.children.len())
            .finish()
    }
}

#[inline]
fn local_of(name: &str) -> &str {
    name.split_once(':').map_or(name, |(_, local)| local)
}

/// Resolve the body of an entity reference (`amp`, `#x41`) to its text.
fn resolve_entity(name: &str) -> Option<String> {
    let resolved = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let code = if let Some(hex) = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)?
        },
    };
    Some(resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = r#"<p:spTree xmlns:p="urn:p" xmlns:a="urn:a">
        <p:nvGrpSpPr><p:cNvPr id="1" name=""/></p:nvGrpSpPr>
        <p:sp><p:nvSpPr><p:cNvPr id="2" name="Title &amp; more"/></p:nvSpPr>
            <p:txBody><a:p><a:r><a:t> </a:t></a:r></a:p><a:p><a:r><a:t>x &lt; y&#x21;</a:t></a:r></a:p></p:txBody>
        </p:sp>
    </p:spTree>"#;

    #[test]
    fn test_parse_names_and_attrs() {
        let root = XmlElement::parse(TREE).unwrap();
        assert_eq!(root.name(), "p:spTree");
        assert!(root.is("spTree"));
        assert_eq!(root.children().len(), 2);

        let sp = root.child("sp").unwrap();
        let c_nv_pr = sp.path(&["nvSpPr", "cNvPr"]).unwrap();
        assert_eq!(c_nv_pr.attr_i64("id"), Some(2));
        assert_eq!(c_nv_pr.attr("name").as_deref(), Some("Title & more"));
    }

    #[test]
    fn test_whitespace_kept_only_in_leaves() {
        let root = XmlElement::parse(TREE).unwrap();
        let texts: Vec<String> = root
            .descendants()
            .into_iter()
            .filter(|e| e.is("t"))
            .map(|e| e.text())
            .collect();
        assert_eq!(texts, vec![" ".to_string(), "x < y!".to_string()]);
        // Indentation between elements is gone
        assert!(!root.to_xml().contains("\n"));
    }

    #[test]
    fn test_serialize_round_trip_escapes() {
        let root = XmlElement::parse(TREE).unwrap();
        let xml = root.to_xml();
        assert!(xml.contains(r#"name="Title &amp; more""#));
        assert!(xml.contains("x &lt; y!"));
        let again = XmlElement::parse(&xml).unwrap();
        assert_eq!(again.to_xml(), xml);
        assert!(root.to_document().starts_with("<?xml"));
    }

    #[test]
    fn test_append_detaches_from_previous_parent() {
        let a = XmlElement::new("a:a");
        let b = XmlElement::new("a:b");
        let child = XmlElement::new("a:c");
        a.append(&child);
        b.append(&child);
        assert!(a.children().is_empty());
        assert_eq!(b.children().len(), 1);
        assert!(child.parent().unwrap().ptr_eq(&b));
    }

    #[test]
    fn test_insert_before_after_and_remove() {
        let root = XmlElement::new("r");
        let first = XmlElement::new("first");
        let last = XmlElement::new("last");
        root.append(&first);
        root.append(&last);
        first.insert_after(&XmlElement::new("middle")).unwrap();
        first.insert_before(&XmlElement::new("zero")).unwrap();
        let names: Vec<String> = root.children().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["zero", "first", "middle", "last"]);

        assert!(first.remove());
        assert!(!first.remove());
        assert_eq!(root.children().len(), 3);
        assert!(XmlElement::new("orphan").insert_after(&first).is_err());
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let root = XmlElement::parse(TREE).unwrap();
        let sp = root.child("sp").unwrap();
        let copy = sp.deep_clone();
        assert!(copy.parent().is_none());
        assert!(!copy.ptr_eq(&sp));
        copy.path(&["nvSpPr", "cNvPr"])
            .unwrap()
            .set_attr("id", "9");
        assert_eq!(sp.path(&["nvSpPr", "cNvPr"]).unwrap().attr("id").as_deref(), Some("2"));
    }

    #[test]
    fn test_ensure_child_and_attrs() {
        let el = XmlElement::new("a:blip");
        let ext = el.ensure_child("extLst", "a:extLst");
        assert!(ext.ptr_eq(&el.ensure_child("extLst", "a:extLst")));
        el.set_attr("r:embed", "rId1");
        el.set_attr("r:embed", "rId2");
        assert_eq!(el.attrs().len(), 1);
        assert_eq!(el.remove_attr("r:embed").as_deref(), Some("rId2"));
        assert!(!el.has_attr("r:embed"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(XmlElement::parse("").is_err());
        assert!(XmlElement::parse("<a><b></a>").is_err());
        assert!(XmlElement::parse("<a>&bogus;</a>").is_err());
    }
}
