//! XML namespaces used in WordprocessingML

/// WordprocessingML main namespace
pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Office document relationships namespace (`r:id` on hyperlinks)
pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// Package relationships namespace (`.rels` parts)
pub const PR: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
/// Content types namespace
pub const CT: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Namespace declarations for a newly created document.xml
pub fn document_namespaces() -> Vec<(&'static str, &'static str)> {
    vec![("xmlns:w", W), ("xmlns:r", R)]
}
