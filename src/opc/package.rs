//! Reading and writing OPC packages as ZIP archives

use crate::error::{Error, Result};
use crate::opc::relationships::rel_types;
use crate::opc::{ContentTypes, Part, PartUri, Relationships};
use log::debug;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::read::ZipArchive;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";
const PACKAGE_RELS_PATH: &str = "_rels/.rels";

/// An OPC package. Parts keep their archive order.
#[derive(Debug, Default)]
pub struct Package {
    parts: Vec<Part>,
    /// Package-level relationships (`/_rels/.rels`)
    relationships: Relationships,
    content_types: ContentTypes,
}

impl Package {
    /// Empty package with the standard content type defaults
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            relationships: Relationships::new(),
            content_types: ContentTypes::new(),
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let content_types = match read_entry(&mut archive, CONTENT_TYPES_PATH)? {
            Some(xml) => ContentTypes::from_xml(&xml)?,
            None => return Err(Error::MissingPart(CONTENT_TYPES_PATH.into())),
        };
        let relationships = match read_entry(&mut archive, PACKAGE_RELS_PATH)? {
            Some(xml) => Relationships::from_xml(&xml)?,
            None => Relationships::new(),
        };

        let mut package = Self {
            parts: Vec::new(),
            relationships,
            content_types,
        };

        let mut rels_entries = Vec::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();
            if name.ends_with('/') || name == CONTENT_TYPES_PATH || name == PACKAGE_RELS_PATH {
                continue;
            }
            if name.ends_with(".rels") && name.contains("_rels/") {
                rels_entries.push(name);
                continue;
            }

            let uri = PartUri::new(&name)?;
            let content_type = package
                .content_types
                .get(&uri)
                .unwrap_or("application/octet-stream")
                .to_string();
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            package.parts.push(Part::new(uri, content_type, data));
        }

        for part in &mut package.parts {
            let rels_path = part.uri().relationships_uri();
            if !rels_entries.iter().any(|n| n == rels_path.zip_path()) {
                continue;
            }
            if let Some(xml) = read_entry(&mut archive, rels_path.zip_path())? {
                *part.relationships_mut() = Relationships::from_xml(&xml)?;
            }
        }

        debug!("opened package with {} parts", package.parts.len());
        Ok(package)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_to(File::create(path)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(Cursor::new(&mut buf))?;
        Ok(buf)
    }

    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(CONTENT_TYPES_PATH, options)?;
        self.content_types.write_to(&mut zip)?;

        if !self.relationships.is_empty() {
            zip.start_file(PACKAGE_RELS_PATH, options)?;
            self.relationships.write_to(&mut zip)?;
        }

        for part in &self.parts {
            zip.start_file(part.uri().zip_path(), options)?;
            zip.write_all(part.data())?;

            let rels = part.relationships();
            if !rels.is_empty() {
                zip.start_file(part.uri().relationships_uri().zip_path(), options)?;
                rels.write_to(&mut zip)?;
            }
        }

        zip.finish()?;
        Ok(())
    }

    pub fn part(&self, uri: &PartUri) -> Option<&Part> {
        self.parts.iter().find(|p| p.uri() == uri)
    }

    /// Insert a part, replacing any part with the same name
    pub fn add_part(&mut self, part: Part) {
        self.content_types.add_override(part.uri(), part.content_type());
        match self.parts.iter_mut().find(|p| p.uri() == part.uri()) {
            Some(existing) => *existing = part,
            None => self.parts.push(part),
        }
    }

    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter()
    }

    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    pub fn relationships_mut(&mut self) -> &mut Relationships {
        &mut self.relationships
    }

    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    /// Name of the main document part, from the package relationships
    pub fn main_document_uri(&self) -> Option<PartUri> {
        let rel = self.relationships.by_type(rel_types::OFFICE_DOCUMENT)?;
        PartUri::new(&rel.target).ok()
    }

    pub fn main_document_part(&self) -> Option<&Part> {
        self.part(&self.main_document_uri()?)
    }
}

/// Read a ZIP entry as text; `None` when absent
fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}
