//! Paragraph element (w:p) and its run views

use crate::document::{
    ContentControl, Hyperlink, InlineElement, Node, ParagraphContent, ParagraphElement,
    ParagraphRun, Run, RunKind, SimpleField,
};
use crate::error::Result;
use crate::xml::{collect_attrs, get_w_attr, get_w_val, RawXmlElement, RawXmlNode};
use log::{debug, warn};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Paragraph (w:p).
///
/// Holds three views of the same inline content:
///
/// - [`element`](Self::element): the w:p child list, written to XML
/// - [`runs`](Self::runs): every run, including runs inside hyperlinks and
///   fields, in document order
/// - [`iruns`](Self::iruns): the runs plus non-run inline elements
///   (content controls), in document order
///
/// The run-editing methods here and on
/// [`ParagraphEditor`](crate::ParagraphEditor) keep the three in step.
#[derive(Debug, Default)]
pub struct Paragraph {
    pub properties: Option<ParagraphProperties>,
    /// Attributes such as rsid*, preserved
    pub attrs: Vec<(String, String)>,
    element: ParagraphElement,
    runs: Vec<ParagraphRun>,
    iruns: Vec<InlineElement>,
}

/// Paragraph properties (w:pPr)
#[derive(Clone, Debug, Default)]
pub struct ParagraphProperties {
    /// w:pStyle
    pub style: Option<String>,
    /// w:outlineLvl
    pub outline_level: Option<u8>,
    pub unknown_children: Vec<RawXmlNode>,
}

impl Paragraph {
    /// Parse from reader (after the w:p start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut properties = None;
        let mut children = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let child = match e.name().local_name().as_ref() {
                        b"pPr" => {
                            properties = Some(ParagraphProperties::from_reader(reader)?);
                            None
                        }
                        b"r" => Some(ParagraphContent::Run(Node::new(Run::from_reader(
                            reader, &e,
                        )?))),
                        b"hyperlink" => Some(ParagraphContent::Hyperlink(Node::new(
                            Hyperlink::from_reader(reader, &e)?,
                        ))),
                        b"fldSimple" => Some(ParagraphContent::Field(Node::new(
                            SimpleField::from_reader(reader, &e)?,
                        ))),
                        b"sdt" => Some(ParagraphContent::ContentControl(Node::new(
                            RawXmlElement::from_reader(reader, &e)?,
                        ))),
                        b"bookmarkStart" | b"bookmarkEnd" => {
                            let child = bookmark(&e);
                            crate::xml::skip_element(reader, &e)?;
                            child
                        }
                        _ => Some(ParagraphContent::Unknown(RawXmlNode::Element(
                            RawXmlElement::from_reader(reader, &e)?,
                        ))),
                    };
                    children.extend(child);
                }
                Event::Empty(e) => {
                    let child = match e.name().local_name().as_ref() {
                        b"pPr" => {
                            properties = Some(ParagraphProperties::default());
                            None
                        }
                        b"r" => Some(ParagraphContent::Run(Node::new(Run::from_empty(&e)?))),
                        b"hyperlink" => Some(ParagraphContent::Hyperlink(Node::new(
                            Hyperlink::from_empty(&e)?,
                        ))),
                        b"fldSimple" => Some(ParagraphContent::Field(Node::new(
                            SimpleField::from_empty(&e)?,
                        ))),
                        b"sdt" => Some(ParagraphContent::ContentControl(Node::new(
                            RawXmlElement::from_empty(&e)?,
                        ))),
                        b"bookmarkStart" | b"bookmarkEnd" => bookmark(&e),
                        _ => Some(ParagraphContent::Unknown(RawXmlNode::Element(
                            RawXmlElement::from_empty(&e)?,
                        ))),
                    };
                    children.extend(child);
                }
                Event::End(e) if e.name().local_name().as_ref() == b"p" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let mut para = Self::from_children(children);
        para.properties = properties;
        para.attrs = collect_attrs(start)?;
        Ok(para)
    }

    /// Create from a self-closing `<w:p/>`
    pub fn from_empty(start: &BytesStart) -> Result<Self> {
        Ok(Paragraph {
            attrs: collect_attrs(start)?,
            ..Default::default()
        })
    }

    /// Build the run views from a child list, in document order
    pub fn from_children(children: Vec<ParagraphContent>) -> Self {
        let mut runs = Vec::new();
        let mut iruns = Vec::new();

        for child in &children {
            let views: Vec<ParagraphRun> = match child {
                ParagraphContent::Run(r) => vec![ParagraphRun::plain(r.clone())],
                ParagraphContent::Hyperlink(link) => link
                    .read()
                    .runs
                    .iter()
                    .map(|r| ParagraphRun::hyperlink(link.clone(), r.clone()))
                    .collect(),
                ParagraphContent::Field(field) => field
                    .read()
                    .runs
                    .iter()
                    .map(|r| ParagraphRun::new(r.clone(), RunKind::Field(field.clone())))
                    .collect(),
                ParagraphContent::ContentControl(sdt) => {
                    iruns.push(InlineElement::ContentControl(ContentControl::new(sdt.clone())));
                    continue;
                }
                _ => continue,
            };
            for run in views {
                runs.push(run.clone());
                iruns.push(InlineElement::Run(run));
            }
        }

        Paragraph {
            element: ParagraphElement::new(children),
            runs,
            iruns,
            ..Default::default()
        }
    }

    /// Create a paragraph holding one run of `text`
    pub fn new(text: impl Into<String>) -> Self {
        let mut para = Paragraph::default();
        para.add_run(Run::new(text));
        para
    }

    /// The w:p child list
    pub fn element(&self) -> &ParagraphElement {
        &self.element
    }

    /// Typed run list
    pub fn runs(&self) -> &[ParagraphRun] {
        &self.runs
    }

    pub fn run(&self, pos: usize) -> Option<&ParagraphRun> {
        self.runs.get(pos)
    }

    /// Inline element list
    pub fn iruns(&self) -> &[InlineElement] {
        &self.iruns
    }

    /// Text of all inline elements
    pub fn text(&self) -> String {
        self.iruns.iter().map(InlineElement::text).collect()
    }

    pub fn style(&self) -> Option<&str> {
        self.properties.as_ref()?.style.as_deref()
    }

    pub fn set_style(&mut self, style: impl Into<String>) {
        self.properties.get_or_insert_with(Default::default).style = Some(style.into());
    }

    /// Whether this paragraph has an outline level or a heading style
    pub fn is_heading(&self) -> bool {
        let Some(props) = &self.properties else {
            return false;
        };
        props.outline_level.is_some()
            || props
                .style
                .as_deref()
                .is_some_and(|s| s.starts_with("Heading") || s.starts_with("heading"))
    }

    /// Append an empty plain run
    pub fn create_run(&mut self) -> ParagraphRun {
        self.add_run(Run::default())
    }

    /// Append `run` as the last child and the last run
    pub fn add_run(&mut self, run: Run) -> ParagraphRun {
        let element = Node::new(run);
        self.element.push(ParagraphContent::Run(element.clone()));
        let run = ParagraphRun::plain(element);
        self.push_run_view(run.clone());
        run
    }

    /// Insert an empty plain run at run position `pos`.
    ///
    /// `pos` may equal the run count (append). Larger positions return
    /// `None` and leave the paragraph untouched.
    pub fn insert_new_run(&mut self, pos: usize) -> Option<ParagraphRun> {
        if pos > self.runs.len() {
            warn!("insert_new_run: position {} past {} runs", pos, self.runs.len());
            return None;
        }

        let anchor = self.runs.get(pos).map(|r| r.element().clone());
        let element = Node::new(Run::default());
        self.element
            .insert_run_like(pos, anchor.as_ref(), ParagraphContent::Run(element.clone()));
        let run = ParagraphRun::plain(element);
        self.insert_run_view(pos, run.clone());
        Some(run)
    }

    /// Remove the run at `pos` from the tree and from both lists.
    ///
    /// Returns `false` if `pos` is out of range.
    pub fn remove_run(&mut self, pos: usize) -> bool {
        if pos >= self.runs.len() {
            return false;
        }

        let run = self.runs.remove(pos);
        if !self.element.remove_run(run.element()) {
            debug!("remove_run: run {} had no element in the tree", pos);
        }
        self.iruns.retain(|e| !e.is_run(&run));
        true
    }

    /// Append `run` to both lists
    pub(crate) fn push_run_view(&mut self, run: ParagraphRun) {
        self.runs.push(run.clone());
        self.iruns.push(InlineElement::Run(run));
    }

    /// Insert `run` at `pos` in the run list and at the matching place in
    /// the inline list: right before the inline entry of the run currently
    /// at `pos`, or at the end. `pos` must be at most the run count.
    pub(crate) fn insert_run_view(&mut self, pos: usize, run: ParagraphRun) {
        let inline_pos = self
            .runs
            .get(pos)
            .and_then(|current| self.iruns.iter().position(|e| e.is_run(current)))
            .unwrap_or(self.iruns.len());

        self.iruns.insert(inline_pos, InlineElement::Run(run.clone()));
        self.runs.insert(pos, run);
    }

    /// Replace every occurrence of `old` in both lists with `new`.
    /// Returns the number of entries replaced.
    pub(crate) fn replace_run_view(&mut self, new: &ParagraphRun, old: &ParagraphRun) -> usize {
        let mut replaced = 0;
        for slot in self.runs.iter_mut().filter(|r| r.is_same(old)) {
            *slot = new.clone();
            replaced += 1;
        }
        for slot in self.iruns.iter_mut().filter(|e| e.is_run(old)) {
            *slot = InlineElement::Run(new.clone());
            replaced += 1;
        }
        replaced
    }

    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:p");
        for (key, value) in &self.attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.properties.is_none() && self.element.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(props) = &self.properties {
            props.write_to(writer)?;
        }
        self.element.write_children(writer)?;
        writer.write_event(Event::End(BytesEnd::new("w:p")))?;
        Ok(())
    }
}

fn bookmark(e: &BytesStart) -> Option<ParagraphContent> {
    let id = get_w_attr(e, "id").unwrap_or_default();
    match e.name().local_name().as_ref() {
        b"bookmarkStart" => Some(ParagraphContent::BookmarkStart {
            id,
            name: get_w_attr(e, "name").unwrap_or_default(),
        }),
        _ => Some(ParagraphContent::BookmarkEnd { id }),
    }
}

impl ParagraphProperties {
    /// Parse from reader (after the w:pPr start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut props = ParagraphProperties::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let raw = RawXmlElement::from_reader(reader, &e)?;
                    props.unknown_children.push(RawXmlNode::Element(raw));
                }
                Event::Empty(e) => match e.name().local_name().as_ref() {
                    b"pStyle" => props.style = get_w_val(&e),
                    b"outlineLvl" => {
                        props.outline_level = get_w_val(&e).and_then(|v| v.parse().ok())
                    }
                    _ => props
                        .unknown_children
                        .push(RawXmlNode::Element(RawXmlElement::from_empty(&e)?)),
                },
                Event::End(e) if e.name().local_name().as_ref() == b"pPr" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(props)
    }

    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;

        if let Some(style) = &self.style {
            let mut elem = BytesStart::new("w:pStyle");
            elem.push_attribute(("w:val", style.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }
        for child in &self.unknown_children {
            child.write_to(writer)?;
        }
        if let Some(level) = self.outline_level {
            let mut elem = BytesStart::new("w:outlineLvl");
            elem.push_attribute(("w:val", level.to_string().as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn parse(xml: &str) -> Paragraph {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf).unwrap() {
                Event::Start(e) => {
                    let e = e.into_owned();
                    return Paragraph::from_reader(&mut reader, &e).unwrap();
                }
                Event::Empty(e) => return Paragraph::from_empty(&e).unwrap(),
                Event::Eof => panic!("no paragraph"),
                _ => {}
            }
            buf.clear();
        }
    }

    fn write(para: &Paragraph) -> String {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        para.write_to(&mut writer).unwrap();
        String::from_utf8(writer.into_inner().into_inner()).unwrap()
    }

    fn run_texts(para: &Paragraph) -> Vec<String> {
        para.runs().iter().map(ParagraphRun::text).collect()
    }

    fn inline_texts(para: &Paragraph) -> Vec<String> {
        para.iruns().iter().map(InlineElement::text).collect()
    }

    const MIXED: &str = concat!(
        r#"<w:p w:rsidR="0012"><w:pPr><w:pStyle w:val="Heading2"/><w:jc w:val="center"/></w:pPr>"#,
        r#"<w:bookmarkStart w:id="0" w:name="top"/>"#,
        r#"<w:r><w:t>A</w:t></w:r>"#,
        r#"<w:sdt><w:sdtContent><w:r><w:t>X</w:t></w:r></w:sdtContent></w:sdt>"#,
        r#"<w:hyperlink r:id="rId5"><w:r><w:t>B</w:t></w:r><w:r><w:t>C</w:t></w:r></w:hyperlink>"#,
        r#"<w:fldSimple w:instr="PAGE"><w:r><w:t>D</w:t></w:r></w:fldSimple>"#,
        r#"<w:bookmarkEnd w:id="0"/>"#,
        r#"</w:p>"#
    );

    #[test]
    fn test_views_follow_document_order() {
        let para = parse(MIXED);

        assert_eq!(run_texts(&para), vec!["A", "B", "C", "D"]);
        assert_eq!(inline_texts(&para), vec!["A", "X", "B", "C", "D"]);
        assert_eq!(para.text(), "AXBCD");
        assert_eq!(para.style(), Some("Heading2"));
        assert!(para.is_heading());

        assert!(!para.runs()[0].is_hyperlink());
        assert_eq!(para.runs()[1].hyperlink_id().as_deref(), Some("rId5"));
        assert!(matches!(para.runs()[3].kind(), RunKind::Field(_)));
    }

    #[test]
    fn test_views_share_tree_elements() {
        let para = parse(MIXED);
        para.runs()[1].set_text("b");

        assert!(write(&para).contains(r#"<w:hyperlink r:id="rId5"><w:r><w:t>b</w:t></w:r>"#));
        assert!(para.iruns()[2].is_run(&para.runs()[1]));
    }

    #[test]
    fn test_write_roundtrip() {
        let para = parse(MIXED);
        assert_eq!(write(&para), MIXED);
    }

    #[test]
    fn test_empty_paragraph() {
        let para = parse(r#"<w:p w:rsidR="01"/>"#);
        assert!(para.runs().is_empty());
        assert!(para.iruns().is_empty());
        assert_eq!(write(&para), r#"<w:p w:rsidR="01"/>"#);
    }

    #[test]
    fn test_new_and_create_run() {
        let mut para = Paragraph::new("Hello");
        let run = para.create_run();
        run.set_text(" world");

        assert_eq!(para.runs().len(), 2);
        assert_eq!(para.iruns().len(), 2);
        assert!(para.runs()[1].is_same(&run));
        assert_eq!(para.text(), "Hello world");
        assert_eq!(para.element().direct_run_count(), 2);
    }

    #[test]
    fn test_insert_new_run_before_content_control_neighbour() {
        let mut para = parse(
            r#"<w:p><w:sdt><w:sdtContent/></w:sdt><w:r><w:t>A</w:t></w:r><w:r><w:t>B</w:t></w:r></w:p>"#,
        );
        let new = para.insert_new_run(1).unwrap();
        new.set_text("N");

        assert_eq!(run_texts(&para), vec!["A", "N", "B"]);
        assert_eq!(inline_texts(&para), vec!["", "A", "N", "B"]);
        assert!(write(&para).contains(
            "<w:r><w:t>A</w:t></w:r><w:r><w:t>N</w:t></w:r><w:r><w:t>B</w:t></w:r>"
        ));
    }

    #[test]
    fn test_insert_new_run_rejects_out_of_range() {
        let mut para = Paragraph::new("A");
        assert!(para.insert_new_run(2).is_none());
        assert_eq!(para.runs().len(), 1);
        assert_eq!(para.element().len(), 1);

        assert!(para.insert_new_run(1).is_some());
        assert_eq!(para.runs().len(), 2);
    }

    #[test]
    fn test_remove_run_updates_all_views() {
        let mut para = parse(MIXED);

        assert!(para.remove_run(1));
        assert_eq!(run_texts(&para), vec!["A", "C", "D"]);
        assert_eq!(inline_texts(&para), vec!["A", "X", "C", "D"]);
        assert!(!write(&para).contains("<w:t>B</w:t>"));

        assert!(para.remove_run(1));
        assert!(!write(&para).contains("w:hyperlink"));

        assert!(!para.remove_run(5));
        assert_eq!(para.runs().len(), 2);
    }

    #[test]
    fn test_replace_run_view_absent_is_noop() {
        let mut para = Paragraph::new("A");
        let stranger = ParagraphRun::plain(Node::new(Run::new("S")));
        let new = ParagraphRun::plain(Node::new(Run::new("N")));

        assert_eq!(para.replace_run_view(&new, &stranger), 0);
        assert_eq!(run_texts(&para), vec!["A"]);
    }
}
