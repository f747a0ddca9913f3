//! A single part of an OPC package

use crate::error::Result;
use crate::opc::{PartUri, Relationships};

/// One package part together with the relationship table rooted at it
#[derive(Clone, Debug)]
pub struct Part {
    uri: PartUri,
    content_type: String,
    data: Vec<u8>,
    /// Stored at `<dir>/_rels/<name>.rels`; not written when empty
    relationships: Relationships,
}

impl Part {
    pub fn new(uri: PartUri, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            uri,
            content_type: content_type.into(),
            data,
            relationships: Relationships::new(),
        }
    }

    pub fn with_relationships(mut self, relationships: Relationships) -> Self {
        self.relationships = relationships;
        self
    }

    pub fn uri(&self) -> &PartUri {
        &self.uri
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// XML parts are UTF-8 text
    pub fn data_as_str(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.data)?)
    }

    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    pub fn relationships_mut(&mut self) -> &mut Relationships {
        &mut self.relationships
    }
}
