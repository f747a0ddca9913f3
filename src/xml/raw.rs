//! Raw XML nodes for elements the model does not interpret

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

use crate::error::{Error, Result};
use crate::xml::collect_attrs;

/// Uninterpreted XML node, written back verbatim
#[derive(Clone, Debug)]
pub enum RawXmlNode {
    Element(RawXmlElement),
    Text(String),
    Comment(String),
}

/// Uninterpreted XML element with attributes and children
#[derive(Clone, Debug)]
pub struct RawXmlElement {
    /// Qualified name, e.g. "w:sdt"
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<RawXmlNode>,
    /// Whether the source used `<x/>`
    pub self_closing: bool,
}

impl RawXmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Read a complete element; `start` has already been consumed
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut elem = Self::new(String::from_utf8_lossy(start.name().as_ref()).to_string());
        elem.attributes = collect_attrs(start)?;

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let child = Self::from_reader(reader, &e)?;
                    elem.children.push(RawXmlNode::Element(child));
                }
                Event::Empty(e) => {
                    elem.children.push(RawXmlNode::Element(Self::from_empty(&e)?));
                }
                Event::Text(t) => {
                    let text = t.unescape()?.to_string();
                    if !text.is_empty() {
                        elem.children.push(RawXmlNode::Text(text));
                    }
                }
                Event::Comment(c) => {
                    elem.children
                        .push(RawXmlNode::Comment(String::from_utf8_lossy(&c).to_string()));
                }
                Event::End(e) => {
                    if e.name().as_ref() == elem.name.as_bytes() {
                        break;
                    }
                }
                Event::Eof => {
                    return Err(Error::InvalidDocument(format!(
                        "unexpected EOF inside <{}>",
                        elem.name
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(elem)
    }

    /// Build from a self-closing tag
    pub fn from_empty(e: &BytesStart) -> Result<Self> {
        Ok(Self {
            name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
            attributes: collect_attrs(e)?,
            children: Vec::new(),
            self_closing: true,
        })
    }

    /// Name without the namespace prefix
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Concatenated text of all `w:t` descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out, false);
        out
    }

    fn collect_text(&self, out: &mut String, in_text: bool) {
        let in_text = in_text || self.local_name() == "t";
        for child in &self.children {
            match child {
                RawXmlNode::Element(e) => e.collect_text(out, in_text),
                RawXmlNode::Text(t) if in_text => out.push_str(t),
                _ => {}
            }
        }
    }

    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.self_closing {
            writer.write_event(Event::Empty(start))?;
        } else {
            writer.write_event(Event::Start(start))?;
            for child in &self.children {
                child.write_to(writer)?;
            }
            writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        }

        Ok(())
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: RawXmlElement) -> Self {
        self.children.push(RawXmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(RawXmlNode::Text(text.into()));
        self
    }
}

impl RawXmlNode {
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            RawXmlNode::Element(e) => e.write_to(writer),
            RawXmlNode::Text(t) => {
                writer.write_event(Event::Text(BytesText::new(t)))?;
                Ok(())
            }
            RawXmlNode::Comment(c) => {
                writer.write_event(Event::Comment(BytesText::new(c)))?;
                Ok(())
            }
        }
    }
}
