//! `[Content_Types].xml`

use crate::error::{Error, Result};
use crate::opc::PartUri;
use crate::xml::CT;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub const XML: &str = "application/xml";
pub const MAIN_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

/// Content type declarations of a package
#[derive(Clone, Debug, Default)]
pub struct ContentTypes {
    /// extension (lowercase) -> content type
    defaults: Vec<(String, String)>,
    /// part -> content type
    overrides: Vec<(PartUri, String)>,
}

impl ContentTypes {
    /// Defaults every WordprocessingML package needs
    pub fn new() -> Self {
        let mut ct = Self::default();
        ct.add_default("rels", RELATIONSHIPS);
        ct.add_default("xml", XML);
        ct
    }

    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut ct = Self::default();
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) => match e.name().local_name().as_ref() {
                    b"Default" => {
                        let ext = required_attr(&e, "Extension")?;
                        ct.add_default(&ext, &required_attr(&e, "ContentType")?);
                    }
                    b"Override" => {
                        let uri = PartUri::new(&required_attr(&e, "PartName")?)?;
                        ct.add_override(&uri, &required_attr(&e, "ContentType")?);
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(ct)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut xml = Writer::new(writer);
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

        let mut types = BytesStart::new("Types");
        types.push_attribute(("xmlns", CT));
        xml.write_event(Event::Start(types))?;

        for (ext, content_type) in &self.defaults {
            let mut elem = BytesStart::new("Default");
            elem.push_attribute(("Extension", ext.as_str()));
            elem.push_attribute(("ContentType", content_type.as_str()));
            xml.write_event(Event::Empty(elem))?;
        }
        for (uri, content_type) in &self.overrides {
            let mut elem = BytesStart::new("Override");
            elem.push_attribute(("PartName", uri.as_str()));
            elem.push_attribute(("ContentType", content_type.as_str()));
            xml.write_event(Event::Empty(elem))?;
        }

        xml.write_event(Event::End(BytesEnd::new("Types")))?;
        Ok(())
    }

    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        let extension = extension.to_lowercase();
        self.defaults.retain(|(ext, _)| *ext != extension);
        self.defaults.push((extension, content_type.to_string()));
    }

    pub fn add_override(&mut self, uri: &PartUri, content_type: &str) {
        self.overrides.retain(|(u, _)| u != uri);
        self.overrides.push((uri.clone(), content_type.to_string()));
    }

    /// Content type of a part: override first, then extension default
    pub fn get(&self, uri: &PartUri) -> Option<&str> {
        if let Some((_, ct)) = self.overrides.iter().find(|(u, _)| u == uri) {
            return Some(ct);
        }
        let ext = uri.extension()?.to_lowercase();
        self.defaults
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, ct)| ct.as_str())
    }
}

fn required_attr(element: &BytesStart, name: &str) -> Result<String> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            return Ok(attr.unescape_value()?.to_string());
        }
    }
    Err(Error::MissingAttribute {
        element: String::from_utf8_lossy(element.name().as_ref()).to_string(),
        attr: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_lookup() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="XML" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

        let ct = ContentTypes::from_xml(xml).unwrap();
        let doc = PartUri::new("/word/document.xml").unwrap();
        let styles = PartUri::new("/word/styles.xml").unwrap();
        let image = PartUri::new("/word/media/image1.png").unwrap();

        assert_eq!(ct.get(&doc), Some(MAIN_DOCUMENT));
        assert_eq!(ct.get(&styles), Some(XML));
        assert_eq!(ct.get(&image), None);
    }

    #[test]
    fn test_override_replaces_previous() {
        let mut ct = ContentTypes::new();
        let doc = PartUri::new("/word/document.xml").unwrap();
        ct.add_override(&doc, XML);
        ct.add_override(&doc, MAIN_DOCUMENT);

        let mut out = Vec::new();
        ct.write_to(&mut out).unwrap();
        let reparsed = ContentTypes::from_xml(std::str::from_utf8(&out).unwrap()).unwrap();

        assert_eq!(reparsed.get(&doc), Some(MAIN_DOCUMENT));
        assert_eq!(reparsed.overrides.len(), 1);
    }
}
