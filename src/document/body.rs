//! Document body and block-level content

use crate::document::Paragraph;
use crate::error::Result;
use crate::xml::{RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Block-level content in a document body
#[derive(Debug)]
pub enum BlockContent {
    Paragraph(Paragraph),
    /// Anything else (tables, block-level sdt, ...), preserved for round-trip
    Unknown(RawXmlNode),
}

/// Document body (w:body)
#[derive(Debug, Default)]
pub struct Body {
    pub content: Vec<BlockContent>,
    /// Trailing w:sectPr
    pub section_properties: Option<RawXmlNode>,
}

impl Body {
    /// Parse body from XML reader (after w:body start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut body = Body::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().local_name().as_ref() {
                    b"p" => {
                        let para = Paragraph::from_reader(reader, &e)?;
                        body.content.push(BlockContent::Paragraph(para));
                    }
                    b"sectPr" => {
                        let raw = RawXmlElement::from_reader(reader, &e)?;
                        body.section_properties = Some(RawXmlNode::Element(raw));
                    }
                    _ => {
                        let raw = RawXmlElement::from_reader(reader, &e)?;
                        body.content.push(BlockContent::Unknown(RawXmlNode::Element(raw)));
                    }
                },
                Event::Empty(e) => match e.name().local_name().as_ref() {
                    b"p" => {
                        body.content
                            .push(BlockContent::Paragraph(Paragraph::from_empty(&e)?));
                    }
                    b"sectPr" => {
                        let raw = RawXmlElement::from_empty(&e)?;
                        body.section_properties = Some(RawXmlNode::Element(raw));
                    }
                    _ => {
                        let raw = RawXmlElement::from_empty(&e)?;
                        body.content.push(BlockContent::Unknown(RawXmlNode::Element(raw)));
                    }
                },
                Event::End(e) if e.name().local_name().as_ref() == b"body" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(body)
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.content.iter().filter_map(|c| match c {
            BlockContent::Paragraph(p) => Some(p),
            BlockContent::Unknown(_) => None,
        })
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.content.iter_mut().filter_map(|c| match c {
            BlockContent::Paragraph(p) => Some(p),
            BlockContent::Unknown(_) => None,
        })
    }

    /// Append a paragraph and return it
    pub fn add_paragraph(&mut self, para: Paragraph) -> &mut Paragraph {
        self.content.push(BlockContent::Paragraph(para));
        match self.content.last_mut() {
            Some(BlockContent::Paragraph(p)) => p,
            _ => unreachable!("last block was just pushed as a paragraph"),
        }
    }

    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:body")))?;
        for content in &self.content {
            content.write_to(writer)?;
        }
        if let Some(sect_pr) = &self.section_properties {
            sect_pr.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:body")))?;
        Ok(())
    }
}

impl BlockContent {
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            BlockContent::Paragraph(para) => para.write_to(writer),
            BlockContent::Unknown(node) => node.write_to(writer),
        }
    }
}
