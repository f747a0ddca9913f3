//! XML helpers and raw element preservation for round-trip support

mod namespace;
mod raw;

pub use namespace::*;
pub use raw::{RawXmlElement, RawXmlNode};

use crate::error::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;

/// Get an attribute value by its qualified name, unescaped.
///
/// Malformed attributes and bad entity references read as absent.
pub fn get_attr(element: &BytesStart, name: &str) -> Option<String> {
    element
        .attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Get a `w:`-prefixed attribute, falling back to the unprefixed name
pub fn get_w_attr(element: &BytesStart, local: &str) -> Option<String> {
    get_attr(element, &format!("w:{}", local)).or_else(|| get_attr(element, local))
}

/// Get the w:val attribute
pub fn get_w_val(element: &BytesStart) -> Option<String> {
    get_w_attr(element, "val")
}

/// Parse an OOXML on/off value ("1", "true", "on", or a missing val)
pub fn parse_bool(element: &BytesStart) -> bool {
    match get_w_val(element) {
        None => true,
        Some(v) => matches!(v.as_str(), "1" | "true" | "on"),
    }
}

/// Collect all attributes as (qualified name, unescaped value) pairs.
///
/// Values are stored unescaped; writers escape them again through
/// `push_attribute`.
pub fn collect_attrs(element: &BytesStart) -> Result<Vec<(String, String)>> {
    element
        .attributes()
        .map(|attr| -> Result<(String, String)> {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            Ok((key, value))
        })
        .collect()
}

/// Skip past the end tag matching `start`, honouring nested elements of the same name
pub fn skip_element<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<()> {
    let target = start.name().as_ref().to_vec();
    let mut depth = 1;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == target => depth += 1,
            Event::End(e) if e.name().as_ref() == target => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}
