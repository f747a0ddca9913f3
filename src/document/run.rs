//! Run element (w:r) - a contiguous run of text with uniform formatting

use crate::error::Result;
use crate::xml::{collect_attrs, get_w_attr, get_w_val, parse_bool, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Run element (w:r)
#[derive(Clone, Debug, Default)]
pub struct Run {
    pub properties: Option<RunProperties>,
    pub content: Vec<RunContent>,
    /// Attributes such as rsid*, preserved
    pub attrs: Vec<(String, String)>,
}

/// Content within a run
#[derive(Clone, Debug)]
pub enum RunContent {
    /// w:t
    Text(String),
    /// w:tab
    Tab,
    /// w:br
    Break(BreakType),
    /// w:cr
    CarriageReturn,
    SoftHyphen,
    NoBreakHyphen,
    Unknown(RawXmlNode),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BreakType {
    #[default]
    TextWrapping,
    Page,
    Column,
}

/// Run properties (w:rPr).
///
/// Only the values this crate reads or sets are modelled; everything else
/// is kept raw.
#[derive(Clone, Debug, Default)]
pub struct RunProperties {
    /// w:rStyle
    pub style: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// w:u value ("single", "double", ...)
    pub underline: Option<String>,
    /// RGB hex
    pub color: Option<String>,
    /// Half-points
    pub size: Option<u32>,
    pub unknown_children: Vec<RawXmlNode>,
}

impl Run {
    /// Parse from reader (after the w:r start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut run = Run {
            attrs: collect_attrs(start)?,
            ..Default::default()
        };
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().local_name().as_ref() {
                    b"rPr" => run.properties = Some(RunProperties::from_reader(reader)?),
                    b"t" => run.content.push(RunContent::Text(read_text(reader)?)),
                    _ => {
                        let raw = RawXmlElement::from_reader(reader, &e)?;
                        run.content.push(RunContent::Unknown(RawXmlNode::Element(raw)));
                    }
                },
                Event::Empty(e) => {
                    let content = match e.name().local_name().as_ref() {
                        b"rPr" => {
                            run.properties = Some(RunProperties::default());
                            None
                        }
                        b"t" => Some(RunContent::Text(String::new())),
                        b"tab" => Some(RunContent::Tab),
                        b"br" => Some(RunContent::Break(match get_w_attr(&e, "type").as_deref() {
                            Some("page") => BreakType::Page,
                            Some("column") => BreakType::Column,
                            _ => BreakType::TextWrapping,
                        })),
                        b"cr" => Some(RunContent::CarriageReturn),
                        b"softHyphen" => Some(RunContent::SoftHyphen),
                        b"noBreakHyphen" => Some(RunContent::NoBreakHyphen),
                        _ => Some(RunContent::Unknown(RawXmlNode::Element(
                            RawXmlElement::from_empty(&e)?,
                        ))),
                    };
                    run.content.extend(content);
                }
                Event::End(e) if e.name().local_name().as_ref() == b"r" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(run)
    }

    /// Create from a self-closing `<w:r/>`
    pub fn from_empty(start: &BytesStart) -> Result<Self> {
        Ok(Run {
            attrs: collect_attrs(start)?,
            ..Default::default()
        })
    }

    /// Create a run holding `text`
    pub fn new(text: impl Into<String>) -> Self {
        Run {
            content: vec![RunContent::Text(text.into())],
            ..Default::default()
        }
    }

    /// Text of this run; tabs and line breaks map to '\t' and '\n'
    pub fn text(&self) -> String {
        let mut result = String::new();
        for content in &self.content {
            match content {
                RunContent::Text(t) => result.push_str(t),
                RunContent::Tab => result.push('\t'),
                RunContent::Break(BreakType::TextWrapping) | RunContent::CarriageReturn => {
                    result.push('\n')
                }
                _ => {}
            }
        }
        result
    }

    /// Replace all textual content with `text`, keeping unknown children
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content.retain(|c| matches!(c, RunContent::Unknown(_)));
        self.content.insert(0, RunContent::Text(text.into()));
    }

    pub fn bold(&self) -> bool {
        self.properties.as_ref().and_then(|p| p.bold).unwrap_or(false)
    }

    pub fn italic(&self) -> bool {
        self.properties.as_ref().and_then(|p| p.italic).unwrap_or(false)
    }

    pub fn style(&self) -> Option<&str> {
        self.properties.as_ref()?.style.as_deref()
    }

    pub fn color(&self) -> Option<&str> {
        self.properties.as_ref()?.color.as_deref()
    }

    pub fn underline(&self) -> Option<&str> {
        self.properties.as_ref()?.underline.as_deref()
    }

    /// Font size in points
    pub fn font_size_pt(&self) -> Option<f32> {
        self.properties.as_ref()?.size.map(|s| s as f32 / 2.0)
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.properties_mut().bold = Some(bold);
    }

    pub fn set_italic(&mut self, italic: bool) {
        self.properties_mut().italic = Some(italic);
    }

    pub fn set_style(&mut self, style: impl Into<String>) {
        self.properties_mut().style = Some(style.into());
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.properties_mut().color = Some(color.into());
    }

    pub fn set_underline(&mut self, underline: impl Into<String>) {
        self.properties_mut().underline = Some(underline.into());
    }

    fn properties_mut(&mut self) -> &mut RunProperties {
        self.properties.get_or_insert_with(Default::default)
    }

    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:r");
        for (key, value) in &self.attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.properties.is_none() && self.content.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(props) = &self.properties {
            props.write_to(writer)?;
        }
        for content in &self.content {
            content.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:r")))?;
        Ok(())
    }
}

impl RunContent {
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            RunContent::Text(text) => {
                let mut start = BytesStart::new("w:t");
                if text.starts_with(char::is_whitespace)
                    || text.ends_with(char::is_whitespace)
                    || text.contains("  ")
                {
                    start.push_attribute(("xml:space", "preserve"));
                }
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new("w:t")))?;
            }
            RunContent::Tab => write_empty(writer, "w:tab")?,
            RunContent::Break(break_type) => {
                let mut start = BytesStart::new("w:br");
                match break_type {
                    BreakType::Page => start.push_attribute(("w:type", "page")),
                    BreakType::Column => start.push_attribute(("w:type", "column")),
                    BreakType::TextWrapping => {}
                }
                writer.write_event(Event::Empty(start))?;
            }
            RunContent::CarriageReturn => write_empty(writer, "w:cr")?,
            RunContent::SoftHyphen => write_empty(writer, "w:softHyphen")?,
            RunContent::NoBreakHyphen => write_empty(writer, "w:noBreakHyphen")?,
            RunContent::Unknown(node) => node.write_to(writer)?,
        }
        Ok(())
    }
}

impl RunProperties {
    /// Parse from reader (after the w:rPr start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut props = RunProperties::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let raw = RawXmlElement::from_reader(reader, &e)?;
                    props.unknown_children.push(RawXmlNode::Element(raw));
                }
                Event::Empty(e) => match e.name().local_name().as_ref() {
                    b"rStyle" => props.style = get_w_val(&e),
                    b"b" => props.bold = Some(parse_bool(&e)),
                    b"i" => props.italic = Some(parse_bool(&e)),
                    b"u" => props.underline = get_w_val(&e).or_else(|| Some("single".into())),
                    b"color" => props.color = get_w_val(&e),
                    b"sz" => props.size = get_w_val(&e).and_then(|v| v.parse().ok()),
                    _ => props
                        .unknown_children
                        .push(RawXmlNode::Element(RawXmlElement::from_empty(&e)?)),
                },
                Event::End(e) if e.name().local_name().as_ref() == b"rPr" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(props)
    }

    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;

        if let Some(style) = &self.style {
            write_val(writer, "w:rStyle", style)?;
        }
        if let Some(bold) = self.bold {
            write_toggle(writer, "w:b", bold)?;
        }
        if let Some(italic) = self.italic {
            write_toggle(writer, "w:i", italic)?;
        }
        if let Some(color) = &self.color {
            write_val(writer, "w:color", color)?;
        }
        if let Some(size) = self.size {
            write_val(writer, "w:sz", &size.to_string())?;
        }
        if let Some(underline) = &self.underline {
            write_val(writer, "w:u", underline)?;
        }
        for child in &self.unknown_children {
            child.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
        Ok(())
    }
}

fn write_empty<W: std::io::Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::Empty(BytesStart::new(name)))?;
    Ok(())
}

fn write_val<W: std::io::Write>(writer: &mut Writer<W>, name: &str, val: &str) -> Result<()> {
    let mut elem = BytesStart::new(name);
    elem.push_attribute(("w:val", val));
    writer.write_event(Event::Empty(elem))?;
    Ok(())
}

fn write_toggle<W: std::io::Write>(writer: &mut Writer<W>, name: &str, on: bool) -> Result<()> {
    let mut elem = BytesStart::new(name);
    if !on {
        elem.push_attribute(("w:val", "0"));
    }
    writer.write_event(Event::Empty(elem))?;
    Ok(())
}

/// Read the text of a w:t element
fn read_text<R: BufRead>(reader: &mut Reader<R>) -> Result<String> {
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::End(e) if e.name().local_name().as_ref() == b"t" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn parse(xml: &str) -> Run {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf).unwrap() {
                Event::Start(e) => {
                    let e = e.into_owned();
                    return Run::from_reader(&mut reader, &e).unwrap();
                }
                Event::Empty(e) => return Run::from_empty(&e).unwrap(),
                Event::Eof => panic!("no run"),
                _ => {}
            }
            buf.clear();
        }
    }

    fn write(run: &Run) -> String {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        run.write_to(&mut writer).unwrap();
        String::from_utf8(writer.into_inner().into_inner()).unwrap()
    }

    #[test]
    fn test_parse_text_and_properties() {
        let run = parse(
            r#"<w:r w:rsidR="00AB"><w:rPr><w:rStyle w:val="Hyperlink"/><w:b/><w:sz w:val="28"/><w:color w:val="0563C1"/><w:u w:val="single"/></w:rPr><w:t xml:space="preserve">Hello </w:t><w:tab/><w:t>world</w:t></w:r>"#,
        );

        assert_eq!(run.text(), "Hello \tworld");
        assert_eq!(run.style(), Some("Hyperlink"));
        assert!(run.bold());
        assert!(!run.italic());
        assert_eq!(run.font_size_pt(), Some(14.0));
        assert_eq!(run.color(), Some("0563C1"));
        assert_eq!(run.underline(), Some("single"));
        assert_eq!(run.attrs, vec![("w:rsidR".to_string(), "00AB".to_string())]);
    }

    #[test]
    fn test_unknown_content_roundtrip() {
        let xml = r#"<w:r><w:drawing><wp:inline/></w:drawing><w:t>x</w:t></w:r>"#;
        let run = parse(xml);
        assert_eq!(run.text(), "x");
        assert_eq!(write(&run), xml);
    }

    #[test]
    fn test_set_text_keeps_unknown_children() {
        let mut run = parse(r#"<w:r><w:t>old</w:t><w:br/><w:fldChar w:fldCharType="begin"/></w:r>"#);
        run.set_text("new");

        assert_eq!(run.text(), "new");
        assert_eq!(
            write(&run),
            r#"<w:r><w:t>new</w:t><w:fldChar w:fldCharType="begin"/></w:r>"#
        );
    }

    #[test]
    fn test_empty_run() {
        let run = Run::default();
        assert_eq!(write(&run), "<w:r/>");
        assert_eq!(parse("<w:r/>").text(), "");
    }

    #[test]
    fn test_formatting_setters() {
        let mut run = Run::new(" padded");
        run.set_bold(true);
        run.set_italic(false);
        run.set_style("Hyperlink");

        assert_eq!(
            write(&run),
            r#"<w:r><w:rPr><w:rStyle w:val="Hyperlink"/><w:b/><w:i w:val="0"/></w:rPr><w:t xml:space="preserve"> padded</w:t></w:r>"#
        );
    }
}
