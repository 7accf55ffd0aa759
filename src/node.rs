//! Parsed XML element tree.
//!
//! A [`Node`] is the read-only view the response mapper consumes: tag name,
//! attributes, ordered element children and character data. Parsing is done
//! with `quick-xml`'s pull reader; nothing here knows about the API envelope.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

/// One XML element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
    /// Direct character data. `None` when the element carried no text at all.
    /// The parser never produces `Some("")`; hand-built nodes may.
    pub text: Option<String>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// First direct child with the given tag
    pub fn child(&self, tag: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// A leaf carries neither attributes nor element children
    pub fn is_leaf(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }

    /// Parse a complete XML document and return its root element
    pub fn parse(bytes: &[u8]) -> Result<Node> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut open: Vec<Node> = Vec::new();
        let mut root: Option<Node> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(start)) => open.push(Self::from_start(&start)?),
                Ok(Event::Empty(start)) => {
                    let node = Self::from_start(&start)?;
                    Self::attach(&mut open, &mut root, node)?;
                }
                Ok(Event::End(_)) => {
                    let node = open
                        .pop()
                        .ok_or_else(|| Error::parse("unexpected closing tag"))?;
                    Self::attach(&mut open, &mut root, node)?;
                }
                Ok(Event::Text(text)) => {
                    if let Some(current) = open.last_mut() {
                        let text = text.unescape().map_err(Error::parse)?;
                        current.push_text(&text);
                    }
                }
                Ok(Event::CData(data)) => {
                    if let Some(current) = open.last_mut() {
                        let text = std::str::from_utf8(&data).map_err(Error::parse)?;
                        current.push_text(text);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(Error::parse(format!(
                        "at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            }
            buf.clear();
        }

        if let Some(unclosed) = open.last() {
            return Err(Error::parse(format!("unclosed element <{}>", unclosed.tag)));
        }
        root.ok_or_else(|| Error::parse("document has no root element"))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Node> {
        let tag = std::str::from_utf8(start.name().as_ref())
            .map_err(Error::parse)?
            .to_string();
        let mut node = Node::new(tag);

        for attribute in start.attributes() {
            let attribute = attribute.map_err(Error::parse)?;
            let name = std::str::from_utf8(attribute.key.as_ref())
                .map_err(Error::parse)?
                .to_string();
            let value = attribute.unescape_value().map_err(Error::parse)?;
            node.attributes.insert(name, value.into_owned());
        }

        Ok(node)
    }

    fn attach(open: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<()> {
        if let Some(parent) = open.last_mut() {
            parent.children.push(node);
        } else if root.is_some() {
            return Err(Error::parse(format!(
                "second root element <{}>",
                node.tag
            )));
        } else {
            *root = Some(node);
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.text.get_or_insert_with(String::new).push_str(text);
    }
}
