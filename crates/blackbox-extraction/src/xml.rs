//! Minimal owned XML tree for metadata files.
//!
//! Metadata XML is small and namespace-uniform, so documents are read once
//! with `quick-xml` into an owned tree with namespace prefixes stripped.
//! Extractors then navigate it with the helpers below.

use std::path::Path;

use blackbox_core::errors::ParseError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

/// One element: local name, non-namespace attributes, trimmed text and
/// child elements in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse a document and return its root element.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|e| ParseError::MalformedXml {
                position: reader.buffer_position(),
                message: e.to_string(),
            })?;
            match event {
                Event::Start(start) => {
                    stack.push(open_element(&reader, &start)?);
                }
                Event::Empty(start) => {
                    let element = open_element(&reader, &start)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Event::Text(text) => {
                    let unescaped = text.unescape().map_err(|e| ParseError::MalformedXml {
                        position: reader.buffer_position(),
                        message: e.to_string(),
                    })?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(unescaped.trim());
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(String::from_utf8_lossy(&data).trim());
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(ParseError::UnclosedElement { tag: open.name });
        }
        root.ok_or(ParseError::EmptyDocument)
    }

    /// Read and parse a file.
    pub fn parse_file(path: &Path) -> Result<Self, ParseError> {
        let source = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }

    /// First direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children named `name`.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first direct child named `name`, or `""`.
    pub fn child_text(&self, name: &str) -> &str {
        self.child(name).map_or("", |c| c.text.as_str())
    }

    /// Text of the first direct child named `name` when non-empty.
    pub fn child_text_opt(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str()).filter(|t| !t.is_empty())
    }

    /// `child_text` parsed as an XML boolean (`true` only).
    pub fn child_bool(&self, name: &str) -> bool {
        self.child_text(name).eq_ignore_ascii_case("true")
    }

    /// First descendant named `name` in document order, excluding `self`.
    pub fn descendant(&self, name: &str) -> Option<&XmlElement> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.descendant(name) {
                return Some(found);
            }
        }
        None
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Convert to a JSON value.
    ///
    /// A leaf becomes its text. Otherwise children are grouped by name: a
    /// name seen once maps to the child's value, a repeated name maps to a
    /// sequence. Attributes of a non-leaf element land under `@attrs`.
    pub fn to_value(&self) -> Value {
        if self.is_leaf() {
            return Value::String(self.text.clone());
        }
        let mut map = Map::new();
        if !self.attrs.is_empty() {
            let attrs: Map<String, Value> = self
                .attrs
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            map.insert("@attrs".to_string(), Value::Object(attrs));
        }

        let mut order: Vec<&str> = Vec::new();
        for child in &self.children {
            if !order.contains(&child.name.as_str()) {
                order.push(&child.name);
            }
        }
        for name in order {
            let group: Vec<Value> = self.children(name).map(XmlElement::to_value).collect();
            let value = if group.len() == 1 {
                group.into_iter().next().unwrap_or(Value::Null)
            } else {
                Value::Array(group)
            };
            map.insert(name.to_string(), value);
        }
        Value::Object(map)
    }
}

fn open_element(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<XmlElement, ParseError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError::MalformedXml {
            position: reader.buffer_position(),
            message: e.to_string(),
        })?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| ParseError::MalformedXml {
            position: reader.buffer_position(),
            message: e.to_string(),
        })?;
        attrs.push((key, value.into_owned()));
    }
    Ok(XmlElement {
        name,
        attrs,
        ..XmlElement::default()
    })
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Flow xmlns="http://soap.sforce.com/2006/04/metadata">
    <apiVersion>59.0</apiVersion>
    <decisions>
        <name>Check_Tier</name>
        <rules><name>Gold</name></rules>
        <rules><name>Silver</name></rules>
    </decisions>
    <label>Tier &amp; Status</label>
    <start><object>Account</object></start>
</Flow>"#;

    #[test]
    fn parses_and_strips_namespace() {
        let root = XmlElement::parse(DOC).unwrap();
        assert_eq!(root.name, "Flow");
        assert!(root.attrs.is_empty());
        assert_eq!(root.child_text("apiVersion"), "59.0");
        assert_eq!(root.child_text("label"), "Tier & Status");
        assert_eq!(root.child_text("missing"), "");
        assert_eq!(root.children("decisions").count(), 1);
        assert_eq!(root.descendant("object").map(|e| e.text.as_str()), Some("Account"));
    }

    #[test]
    fn repeated_children_become_sequences() {
        let root = XmlElement::parse(DOC).unwrap();
        let decision = root.child("decisions").unwrap();
        assert_eq!(
            decision.to_value(),
            json!({"name": "Check_Tier", "rules": [{"name": "Gold"}, {"name": "Silver"}]})
        );
    }

    #[test]
    fn malformed_documents_are_errors() {
        assert!(matches!(
            XmlElement::parse("<a><b></a>"),
            Err(ParseError::MalformedXml { .. })
        ));
        assert!(matches!(
            XmlElement::parse("<a><b>"),
            Err(ParseError::UnclosedElement { .. } | ParseError::MalformedXml { .. })
        ));
        assert!(matches!(XmlElement::parse("   "), Err(ParseError::EmptyDocument)));
    }
}
