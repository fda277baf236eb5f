//! Generic XML tree used by the PPTX domain parsers.
//!
//! DrawingML is order-sensitive in several places (z-order of shapes, the
//! command stream of custom geometry paths, guide declaration order), so the
//! tree keeps children as an ordered sequence rather than a map. Namespace
//! prefixes (`p:`, `a:`, `r:`, ...) are stripped from element names; attribute
//! names keep their full qualified form so `id` and `r:id` stay distinct.

use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// An XML element with ordered children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    /// Local element name (namespace prefix stripped).
    pub name: String,
    /// Attributes in document order, with qualified names.
    pub attrs: Vec<(String, String)>,
    /// Child elements and text in document order.
    pub children: Vec<XmlChild>,
}

/// A child of an element: nested element or character data.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlChild {
    Element(XmlNode),
    Text(String),
}

impl XmlNode {
    /// Parse an XML document and return its root element.
    pub fn parse(xml: &str) -> Result<XmlNode> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().expand_empty_elements = false;

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let node = node_from_tag(&e)?;
                    stack.push(node);
                }
                Ok(Event::Empty(e)) => {
                    let node = node_from_tag(&e)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::End(_)) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| Error::XmlParse("unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::XmlParse(err.to_string()))?
                        .into_owned();
                    if let Some(parent) = stack.last_mut() {
                        if !text.is_empty() {
                            parent.children.push(XmlChild::Text(text));
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlChild::Text(text));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        root.ok_or_else(|| Error::XmlParse("empty document".to_string()))
    }

    /// First child element with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find_map(|c| match c {
            XmlChild::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// All child elements with the given local name, in document order.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter_map(move |c| match c {
            XmlChild::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// All child elements regardless of name, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlNode> {
        self.children.iter().filter_map(|c| match c {
            XmlChild::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Attribute value by local name (prefix ignored). The unqualified form
    /// wins when both `id` and `r:id` are present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        if let Some(v) = self.attr_exact(name) {
            return Some(v);
        }
        self.attrs
            .iter()
            .find(|(k, _)| k.rsplit(':').next() == Some(name) && k.contains(':'))
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value by exact qualified name (e.g. "r:id").
    pub fn attr_exact(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute parsed as i64, None if absent or malformed.
    pub fn attr_i64(&self, name: &str) -> Option<i64> {
        self.attr(name).and_then(|v| v.parse().ok())
    }

    /// Attribute parsed as f64, None if absent or malformed.
    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        self.attr(name).and_then(|v| v.parse().ok())
    }

    /// Attribute interpreted as an OOXML boolean ("1"/"true").
    pub fn attr_bool(&self, name: &str) -> bool {
        matches!(self.attr(name), Some("1") | Some("true"))
    }

    /// Concatenated text content of this element (direct children only).
    pub fn text(&self) -> String {
        let mut out = String::new();
        for c in &self.children {
            if let XmlChild::Text(t) = c {
                out.push_str(t);
            }
        }
        out
    }

    /// Text content of the first child element with the given name.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(|c| c.text())
    }
}

fn strip_prefix(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn node_from_tag(e: &quick_xml::events::BytesStart<'_>) -> Result<XmlNode> {
    let raw_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut node = XmlNode {
        name: strip_prefix(&raw_name).to_string(),
        attrs: Vec::new(),
        children: Vec::new(),
    };
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::XmlParse(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|err| Error::XmlParse(err.to_string()))?
            .into_owned();
        node.attrs.push((key, value));
    }
    Ok(node)
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlChild::Element(node));
            Ok(())
        }
        None => {
            if root.is_some() {
                return Err(Error::XmlParse("multiple root elements".to_string()));
            }
            *root = Some(node);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_element_prefixes() {
        let root = XmlNode::parse(
            r#"<p:sld xmlns:p="urn:p"><p:cSld><p:spTree><p:sp/><p:pic/><p:sp/></p:spTree></p:cSld></p:sld>"#,
        )
        .unwrap();
        assert_eq!(root.name, "sld");
        let tree = root.child("cSld").unwrap().child("spTree").unwrap();
        let names: Vec<_> = tree.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["sp", "pic", "sp"]);
    }

    #[test]
    fn test_attr_qualified_vs_local() {
        let root =
            XmlNode::parse(r#"<sldId id="256" r:id="rId2" xmlns:r="urn:r"/>"#).unwrap();
        assert_eq!(root.attr("id"), Some("256"));
        assert_eq!(root.attr_exact("r:id"), Some("rId2"));
        // local lookup falls back to a prefixed attribute
        let blip = XmlNode::parse(r#"<blip r:embed="rId3" xmlns:r="urn:r"/>"#).unwrap();
        assert_eq!(blip.attr("embed"), Some("rId3"));
    }

    #[test]
    fn test_children_preserve_document_order() {
        let root = XmlNode::parse(
            "<path><moveTo/><lnTo a=\"1\"/><cubicBezTo/><lnTo a=\"2\"/><close/></path>",
        )
        .unwrap();
        let order: Vec<_> = root.elements().map(|e| e.name.clone()).collect();
        assert_eq!(order, ["moveTo", "lnTo", "cubicBezTo", "lnTo", "close"]);
        let lines: Vec<_> = root.children("lnTo").filter_map(|n| n.attr("a")).collect();
        assert_eq!(lines, ["1", "2"]);
    }

    #[test]
    fn test_text_and_entities() {
        let root = XmlNode::parse("<a:t xmlns:a=\"urn:a\">Q&amp;A &lt;3</a:t>").unwrap();
        assert_eq!(root.text(), "Q&A <3");
    }

    #[test]
    fn test_attr_helpers() {
        let root = XmlNode::parse(r#"<off x="914400" y="-5" rot="2.5" flipH="1"/>"#).unwrap();
        assert_eq!(root.attr_i64("x"), Some(914400));
        assert_eq!(root.attr_i64("y"), Some(-5));
        assert_eq!(root.attr_f64("rot"), Some(2.5));
        assert!(root.attr_bool("flipH"));
        assert!(!root.attr_bool("flipV"));
    }
}
