//! Document model: the main document part and its paragraphs

mod body;
mod container;
mod editor;
mod element;
mod inline;
mod node;
mod paragraph;
mod run;

pub use body::{BlockContent, Body};
pub use container::{Hyperlink, SimpleField};
pub use editor::ParagraphEditor;
pub use element::{ParagraphContent, ParagraphElement};
pub use inline::{ContentControl, InlineElement, ParagraphRun, RunKind};
pub use node::Node;
pub use paragraph::{Paragraph, ParagraphProperties};
pub use run::{BreakType, Run, RunContent, RunProperties};

use crate::error::{Error, Result};
use crate::opc::{rel_types, Package, Part, PartUri, Relationships, MAIN_DOCUMENT};
use crate::xml::{self, RawXmlElement, RawXmlNode};
use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;
use std::path::Path;

const DEFAULT_DOCUMENT_PATH: &str = "/word/document.xml";

/// A DOCX document
#[derive(Debug)]
pub struct Document {
    package: Package,
    /// Name of the main document part
    uri: PartUri,
    /// Attributes of w:document (namespace declarations, mc:Ignorable, ...)
    root_attrs: Vec<(String, String)>,
    /// w:document children other than w:body (w:background, ...)
    prelude: Vec<RawXmlNode>,
    body: Body,
    /// Relationship table of the main document part
    relationships: Relationships,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self {
            package: Package::new(),
            uri: PartUri::from_static(DEFAULT_DOCUMENT_PATH),
            root_attrs: xml::document_namespaces()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            prelude: Vec::new(),
            body: Body::default(),
            relationships: Relationships::new(),
        }
    }

    /// Open a document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_package(Package::open(path)?)
    }

    /// Open a document from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(bytes)?)
    }

    pub fn from_package(package: Package) -> Result<Self> {
        let uri = package
            .main_document_uri()
            .ok_or(Error::NoMainDocument)?;
        let part = package
            .part(&uri)
            .ok_or_else(|| Error::MissingPart(uri.to_string()))?;

        let parsed = parse_document_xml(part.data_as_str()?)?;
        let relationships = part.relationships().clone();
        debug!(
            "loaded {} with {} block(s) and {} relationship(s)",
            uri,
            parsed.body.content.len(),
            relationships.len()
        );

        Ok(Self {
            package,
            uri,
            root_attrs: parsed.root_attrs,
            prelude: parsed.prelude,
            body: parsed.body,
            relationships,
        })
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.update_package()?;
        self.package.save(path)
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.update_package()?;
        self.package.to_bytes()
    }

    /// Write the body and relationship table back into the package
    fn update_package(&mut self) -> Result<()> {
        let xml = serialize_document_xml(&self.root_attrs, &self.prelude, &self.body)?;
        let content_type = self
            .package
            .part(&self.uri)
            .map(|p| p.content_type().to_string())
            .unwrap_or_else(|| MAIN_DOCUMENT.to_string());

        let part = Part::new(self.uri.clone(), content_type, xml.into_bytes())
            .with_relationships(self.relationships.clone());
        self.package.add_part(part);

        if self.package.main_document_uri().is_none() {
            let target = self.uri.zip_path().to_string();
            self.package
                .relationships_mut()
                .add(rel_types::OFFICE_DOCUMENT, &target);
        }
        Ok(())
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.paragraphs()
    }

    pub fn paragraph_count(&self) -> usize {
        self.body.paragraphs().count()
    }

    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.body.paragraphs().nth(index)
    }

    pub fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        self.body.paragraphs_mut().nth(index)
    }

    /// Editor for paragraph `index`, bound to the main part's relationships
    pub fn editor(&mut self, index: usize) -> Option<ParagraphEditor<'_>> {
        let paragraph = self.body.paragraphs_mut().nth(index)?;
        Some(ParagraphEditor::new(paragraph, &mut self.relationships))
    }

    /// URL a hyperlink run points at
    pub fn hyperlink_target(&self, run: &ParagraphRun) -> Option<&str> {
        let id = run.hyperlink_id()?;
        self.relationships.get(&id).map(|rel| rel.target.as_str())
    }

    /// Get all text in the document, one line per paragraph
    pub fn text(&self) -> String {
        self.body
            .paragraphs()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Add a paragraph with text
    pub fn add_paragraph(&mut self, text: impl Into<String>) -> &mut Paragraph {
        self.body.add_paragraph(Paragraph::new(text))
    }

    pub fn add_empty_paragraph(&mut self) -> &mut Paragraph {
        self.body.add_paragraph(Paragraph::default())
    }

    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

struct ParsedDocument {
    root_attrs: Vec<(String, String)>,
    prelude: Vec<RawXmlNode>,
    body: Body,
}

/// Parse document.xml content
fn parse_document_xml(content: &str) -> Result<ParsedDocument> {
    // no trim_text: w:t content is whitespace-sensitive
    let mut reader = Reader::from_str(content);
    let mut buf = Vec::new();
    let mut root_attrs = Vec::new();
    let mut prelude = Vec::new();
    let mut body = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().local_name().as_ref() {
                b"document" => root_attrs = xml::collect_attrs(&e)?,
                b"body" => body = Some(Body::from_reader(&mut reader)?),
                _ => {
                    let raw = RawXmlElement::from_reader(&mut reader, &e)?;
                    prelude.push(RawXmlNode::Element(raw));
                }
            },
            Event::Empty(e) => match e.name().local_name().as_ref() {
                b"document" => root_attrs = xml::collect_attrs(&e)?,
                b"body" => body = Some(Body::default()),
                _ => prelude.push(RawXmlNode::Element(RawXmlElement::from_empty(&e)?)),
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let body = body.ok_or_else(|| Error::InvalidDocument("Missing w:body element".into()))?;
    Ok(ParsedDocument {
        root_attrs,
        prelude,
        body,
    })
}

/// Serialize to document.xml content
fn serialize_document_xml(
    root_attrs: &[(String, String)],
    prelude: &[RawXmlNode],
    body: &Body,
) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut doc_start = BytesStart::new("w:document");
    for (key, value) in root_attrs {
        doc_start.push_attribute((key.as_str(), value.as_str()));
    }
    // hyperlinks written by this crate need the r: prefix
    if !root_attrs.iter().any(|(k, _)| k == "xmlns:r") {
        doc_start.push_attribute(("xmlns:r", xml::R));
    }
    writer.write_event(Event::Start(doc_start))?;

    for node in prelude {
        node.write_to(&mut writer)?;
    }
    body.write_to(&mut writer)?;

    writer.write_event(Event::End(BytesEnd::new("w:document")))?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SIMPLE_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:r><w:t>Hello, World!</w:t></w:r>
    </w:p>
    <w:p>
      <w:pPr><w:pStyle w:val="Heading1"/></w:pPr>
      <w:r><w:rPr><w:b/></w:rPr><w:t>This is a heading</w:t></w:r>
    </w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_parse_simple_document() {
        let parsed = parse_document_xml(SIMPLE_DOC).unwrap();
        let paras: Vec<_> = parsed.body.paragraphs().collect();
        assert_eq!(paras.len(), 2);

        assert_eq!(paras[0].text(), "Hello, World!");
        assert_eq!(paras[1].text(), "This is a heading");
        assert_eq!(paras[1].style(), Some("Heading1"));
        assert!(paras[1].is_heading());
        assert!(paras[1].runs()[0].element().read().bold());
        assert_eq!(parsed.root_attrs.len(), 1);
    }

    #[test]
    fn test_missing_body() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;
        assert!(matches!(
            parse_document_xml(xml),
            Err(Error::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_serialize_adds_relationship_namespace() {
        let parsed = parse_document_xml(SIMPLE_DOC).unwrap();
        let out = serialize_document_xml(&parsed.root_attrs, &parsed.prelude, &parsed.body).unwrap();

        assert!(out.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(out.contains(&format!(r#"xmlns:r="{}""#, xml::R)));
        assert!(out.contains("<w:t>Hello, World!</w:t>"));
    }

    #[test]
    fn test_prelude_is_preserved() {
        let xml = r#"<w:document xmlns:w="w" xmlns:r="r"><w:background w:color="FFFFFF"/><w:body><w:p/></w:body></w:document>"#;
        let parsed = parse_document_xml(xml).unwrap();
        let out = serialize_document_xml(&parsed.root_attrs, &parsed.prelude, &parsed.body).unwrap();

        assert!(out.ends_with(
            r#"<w:document xmlns:w="w" xmlns:r="r"><w:background w:color="FFFFFF"/><w:body><w:p/></w:body></w:document>"#
        ));
    }

    #[test]
    fn test_new_document_saves_and_reopens() {
        let mut doc = Document::new();
        doc.add_paragraph("first");
        {
            let mut editor = doc.editor(0).unwrap();
            editor
                .create_hyperlink_run("https://example.com")
                .set_text("link");
        }

        let bytes = doc.to_bytes().unwrap();
        let reopened = Document::from_bytes(&bytes).unwrap();

        assert_eq!(reopened.text(), "firstlink");
        let link = &reopened.paragraph(0).unwrap().runs()[1];
        assert_eq!(reopened.hyperlink_target(link), Some("https://example.com"));
    }
}
