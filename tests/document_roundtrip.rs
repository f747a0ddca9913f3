//! Integration test: opening, building and saving documents

mod common;

use common::{docx_with_body, init_logging};
use docx_runsync::document::BlockContent;
use docx_runsync::opc::rel_types;
use docx_runsync::{Document, Error, Package, PartUri};
use pretty_assertions::assert_eq;

const BODY: &str = concat!(
    r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Title</w:t></w:r></w:p>"#,
    r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
    r#"<w:p><w:r><w:t xml:space="preserve">Hello </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>world</w:t></w:r></w:p>"#,
);

#[test]
fn test_open_and_read() {
    init_logging();
    let doc = Document::from_bytes(&docx_with_body(BODY)).unwrap();

    assert_eq!(doc.paragraph_count(), 2);
    assert_eq!(doc.text(), "Title\nHello world");

    let title = doc.paragraph(0).unwrap();
    assert_eq!(title.style(), Some("Heading1"));
    assert!(title.is_heading());

    let body = doc.paragraph(1).unwrap();
    assert!(body.runs()[1].element().read().bold());
}

#[test]
fn test_unknown_blocks_roundtrip() {
    init_logging();
    let mut doc = Document::from_bytes(&docx_with_body(BODY)).unwrap();
    let bytes = doc.to_bytes().unwrap();

    let package = Package::from_bytes(&bytes).unwrap();
    let part = package
        .part(&PartUri::new("/word/document.xml").unwrap())
        .unwrap();
    let xml = part.data_as_str().unwrap();

    assert!(xml.contains(r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#));
    assert!(xml.contains(r#"<w:t xml:space="preserve">Hello </w:t>"#));
    assert!(xml.contains("<w:sectPr/>"));
    assert!(package.part(&PartUri::new("/word/styles.xml").unwrap()).is_some());

    let reopened = Document::from_bytes(&bytes).unwrap();
    assert!(matches!(
        reopened.body().content[1],
        BlockContent::Unknown(_)
    ));
}

#[test]
fn test_build_new_document() {
    init_logging();
    let mut doc = Document::new();
    doc.add_paragraph("Intro").set_style("Heading1");
    let para = doc.add_empty_paragraph();
    para.create_run().set_text("see ");
    doc.editor(1)
        .unwrap()
        .create_hyperlink_run("https://docs.example/")
        .set_text("docs");

    let bytes = doc.to_bytes().unwrap();

    let package = Package::from_bytes(&bytes).unwrap();
    let main = package
        .relationships()
        .by_type(rel_types::OFFICE_DOCUMENT)
        .unwrap();
    assert_eq!(main.target, "word/document.xml");

    let reopened = Document::from_bytes(&bytes).unwrap();
    assert_eq!(reopened.text(), "Intro\nsee docs");
    let link = &reopened.paragraph(1).unwrap().runs()[1];
    assert_eq!(reopened.hyperlink_target(link), Some("https://docs.example/"));
}

#[test]
fn test_save_to_file() {
    init_logging();
    let path = std::env::temp_dir().join(format!("docx-runsync-{}.docx", std::process::id()));

    let mut doc = Document::new();
    doc.add_paragraph("on disk");
    doc.save(&path).unwrap();

    let reopened = Document::open(&path).unwrap();
    assert_eq!(reopened.text(), "on disk");
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_package_without_main_document() {
    let bytes = Package::new().to_bytes().unwrap();

    assert!(matches!(
        Document::from_bytes(&bytes),
        Err(Error::NoMainDocument)
    ));
}

#[test]
fn test_escaped_attributes_survive_save() {
    init_logging();
    let body = concat!(
        r#"<w:p><w:fldSimple w:instr=" HYPERLINK &quot;http://a/?x=1&amp;y=2&quot; "><w:r><w:t>go</w:t></w:r></w:fldSimple>"#,
        r#"<w:hyperlink r:id="rId9" w:tooltip="Tom &amp; Jerry"><w:r><w:t>tj</w:t></w:r></w:hyperlink></w:p>"#,
    );
    let mut doc = Document::from_bytes(&docx_with_body(body)).unwrap();
    let bytes = doc.to_bytes().unwrap();

    let package = Package::from_bytes(&bytes).unwrap();
    let part = package
        .part(&PartUri::new("/word/document.xml").unwrap())
        .unwrap();
    let xml = part.data_as_str().unwrap();

    assert!(xml.contains(r#"w:instr=" HYPERLINK &quot;http://a/?x=1&amp;y=2&quot; ""#));
    assert!(xml.contains(r#"w:tooltip="Tom &amp; Jerry""#));
    assert!(!xml.contains("&amp;quot;"));
    assert!(!xml.contains("&amp;amp;"));

    // a second save must not escape again
    let mut reopened = Document::from_bytes(&bytes).unwrap();
    assert_eq!(reopened.text(), "gotj");
    let again = reopened.to_bytes().unwrap();
    let package = Package::from_bytes(&again).unwrap();
    let xml = package
        .part(&PartUri::new("/word/document.xml").unwrap())
        .unwrap()
        .data_as_str()
        .unwrap()
        .to_string();
    assert!(xml.contains(r#"w:tooltip="Tom &amp; Jerry""#));
}
