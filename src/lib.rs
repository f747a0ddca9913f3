//! # docx-runsync
//!
//! A DOCX paragraph model whose run views stay consistent under
//! out-of-band edits.
//!
//! A paragraph keeps three views of its inline content: the `w:p` child
//! elements, the typed run list and the inline element list (runs plus
//! non-run inline elements such as content controls). Every operation here
//! updates all three together:
//!
//! - append a hyperlink run
//! - insert a hyperlink run at a run position
//! - swap one run identity for another
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docx_runsync::Document;
//!
//! let mut doc = Document::open("template.docx")?;
//!
//! let mut editor = doc.editor(0).expect("paragraph 0");
//! if let Some(link) = editor.insert_new_hyperlink_run(1, "https://example.com") {
//!     link.set_text("example");
//! }
//!
//! doc.save("output.docx")?;
//! ```

pub mod document;
pub mod error;
pub mod opc;
pub mod xml;

pub use document::{
    Document, InlineElement, Node, Paragraph, ParagraphEditor, ParagraphElement, ParagraphRun,
    Run,
};
pub use error::{Error, Result};
pub use opc::{Package, Part, PartUri};
