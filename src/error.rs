//! Error types for docx-runsync

use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    // Container and parsing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML encoding error: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("serialized XML is not UTF-8: {0}")]
    Utf8Output(#[from] std::string::FromUtf8Error),

    // Package structure
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// No officeDocument relationship in `/_rels/.rels`
    #[error("Package has no main document relationship")]
    NoMainDocument,

    #[error("Invalid part URI: {0}")]
    InvalidPartUri(String),

    #[error("Missing attribute '{attr}' on element '{element}'")]
    MissingAttribute { element: String, attr: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    // Paragraph edits
    /// A hyperlink or field run offered where a direct `w:r` is needed
    #[error("Run inside a {0} cannot be placed as a direct paragraph run")]
    NestedRun(&'static str),

    /// A `w:r` index past the paragraph's direct run children
    #[error("Run index {index} out of bounds ({len} direct runs)")]
    RunIndexOutOfBounds { index: usize, len: usize },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
