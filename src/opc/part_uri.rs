//! Part names inside an OPC package

use crate::error::{Error, Result};
use std::fmt;

/// Absolute part name, e.g. `/word/document.xml`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PartUri {
    path: String,
}

impl PartUri {
    /// Create a part URI, adding the leading '/' and dropping a trailing one
    pub fn new(path: &str) -> Result<Self> {
        let trimmed = path.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(Error::InvalidPartUri(format!("empty path '{}'", path)));
        }

        let path = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };

        if path.contains("//") {
            return Err(Error::InvalidPartUri(format!(
                "invalid path '{}': contains double slashes",
                path
            )));
        }

        Ok(Self { path })
    }

    /// Part name known to be normalised already
    pub(crate) fn from_static(path: &'static str) -> Self {
        debug_assert!(path.starts_with('/') && !path.ends_with('/'));
        Self {
            path: path.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Path inside the ZIP archive (no leading '/')
    pub fn zip_path(&self) -> &str {
        &self.path[1..]
    }

    /// Last path segment
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }

    /// File extension, if any
    pub fn extension(&self) -> Option<&str> {
        let (_, ext) = self.file_name().rsplit_once('.')?;
        (!ext.is_empty()).then_some(ext)
    }

    /// Directory containing this part, without trailing '/'
    fn directory(&self) -> &str {
        self.path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or_default()
    }

    /// Relationships part for this part.
    ///
    /// `/word/document.xml` maps to `/word/_rels/document.xml.rels`.
    pub fn relationships_uri(&self) -> PartUri {
        PartUri {
            path: format!("{}/_rels/{}.rels", self.directory(), self.file_name()),
        }
    }
}

impl fmt::Display for PartUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}
