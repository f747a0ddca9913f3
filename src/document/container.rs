//! Run containers: w:hyperlink and w:fldSimple
//!
//! Both wrap runs that appear in the paragraph's typed run list even though
//! they are not direct children of w:p.

use crate::document::{Node, Run};
use crate::error::Result;
use crate::xml::{collect_attrs, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Hyperlink element (w:hyperlink)
#[derive(Debug, Default)]
pub struct Hyperlink {
    /// r:id of the external relationship holding the URL
    pub r_id: Option<String>,
    /// Bookmark name for internal links
    pub anchor: Option<String>,
    /// Remaining attributes (w:history, w:tooltip, ...)
    pub attrs: Vec<(String, String)>,
    pub runs: Vec<Node<Run>>,
    /// Non-run children, written after the runs
    pub unknown_children: Vec<RawXmlNode>,
}

/// Simple field (w:fldSimple)
#[derive(Debug, Default)]
pub struct SimpleField {
    /// w:instr, e.g. "PAGE"
    pub instr: String,
    pub attrs: Vec<(String, String)>,
    pub runs: Vec<Node<Run>>,
    pub unknown_children: Vec<RawXmlNode>,
}

impl Hyperlink {
    /// External hyperlink bound to relationship `r_id`
    pub fn external(r_id: impl Into<String>) -> Self {
        Self {
            r_id: Some(r_id.into()),
            ..Default::default()
        }
    }

    /// Parse from reader (after the w:hyperlink start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut link = Self::from_empty(start)?;
        let (runs, unknown) = read_runs(reader, b"hyperlink")?;
        link.runs = runs;
        link.unknown_children = unknown;
        Ok(link)
    }

    /// Create from a self-closing `<w:hyperlink/>`
    pub fn from_empty(start: &BytesStart) -> Result<Self> {
        let mut link = Self::default();
        for (key, value) in collect_attrs(start)? {
            match key.as_str() {
                "r:id" => link.r_id = Some(value),
                "w:anchor" | "anchor" => link.anchor = Some(value),
                _ => link.attrs.push((key, value)),
            }
        }
        Ok(link)
    }

    /// Append a new empty run and return its handle
    pub fn add_new_run(&mut self) -> Node<Run> {
        let run = Node::new(Run::default());
        self.runs.push(run.clone());
        run
    }

    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:hyperlink");
        if let Some(r_id) = &self.r_id {
            start.push_attribute(("r:id", r_id.as_str()));
        }
        if let Some(anchor) = &self.anchor {
            start.push_attribute(("w:anchor", anchor.as_str()));
        }
        for (key, value) in &self.attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        write_container(writer, start, "w:hyperlink", &self.runs, &self.unknown_children)
    }
}

impl SimpleField {
    /// Parse from reader (after the w:fldSimple start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut field = Self::from_empty(start)?;
        let (runs, unknown) = read_runs(reader, b"fldSimple")?;
        field.runs = runs;
        field.unknown_children = unknown;
        Ok(field)
    }

    pub fn from_empty(start: &BytesStart) -> Result<Self> {
        let mut field = Self::default();
        for (key, value) in collect_attrs(start)? {
            match key.as_str() {
                "w:instr" | "instr" => field.instr = value,
                _ => field.attrs.push((key, value)),
            }
        }
        Ok(field)
    }

    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:fldSimple");
        start.push_attribute(("w:instr", self.instr.as_str()));
        for (key, value) in &self.attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        write_container(writer, start, "w:fldSimple", &self.runs, &self.unknown_children)
    }
}

/// Read child runs until the end tag whose local name is `end`
fn read_runs<R: BufRead>(
    reader: &mut Reader<R>,
    end: &[u8],
) -> Result<(Vec<Node<Run>>, Vec<RawXmlNode>)> {
    let mut runs = Vec::new();
    let mut unknown = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if e.name().local_name().as_ref() == b"r" {
                    runs.push(Node::new(Run::from_reader(reader, &e)?));
                } else {
                    let raw = RawXmlElement::from_reader(reader, &e)?;
                    unknown.push(RawXmlNode::Element(raw));
                }
            }
            Event::Empty(e) => {
                if e.name().local_name().as_ref() == b"r" {
                    runs.push(Node::new(Run::from_empty(&e)?));
                } else {
                    unknown.push(RawXmlNode::Element(RawXmlElement::from_empty(&e)?));
                }
            }
            Event::End(e) if e.name().local_name().as_ref() == end => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((runs, unknown))
}

fn write_container<W: std::io::Write>(
    writer: &mut Writer<W>,
    start: BytesStart,
    name: &str,
    runs: &[Node<Run>],
    unknown: &[RawXmlNode],
) -> Result<()> {
    if runs.is_empty() && unknown.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for run in runs {
        run.read().write_to(writer)?;
    }
    for child in unknown {
        child.write_to(writer)?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
