//! Open Packaging Convention (OPC) container
//!
//! DOCX files are ZIP archives of parts tied together by relationship
//! tables. Hyperlink targets live in these tables, not in document.xml.

mod content_types;
mod package;
mod part;
mod part_uri;
mod relationships;

pub use content_types::{ContentTypes, MAIN_DOCUMENT, RELATIONSHIPS, XML};
pub use package::Package;
pub use part::Part;
pub use part_uri::PartUri;
pub use relationships::{rel_types, Relationship, Relationships, TargetMode};
