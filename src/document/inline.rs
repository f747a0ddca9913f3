//! Typed run views and inline elements of a paragraph

use crate::document::{Hyperlink, Node, Run, SimpleField};
use crate::xml::RawXmlElement;
use std::sync::Arc;

/// A run as seen from the paragraph's typed run list.
///
/// Wraps a w:r node together with the container it sits in. Clones share
/// identity; two views are the same run only if [`ParagraphRun::is_same`]
/// says so, regardless of their content. Wrapping the same w:r twice yields
/// two different runs.
#[derive(Clone, Debug)]
pub struct ParagraphRun(Arc<RunView>);

#[derive(Debug)]
struct RunView {
    element: Node<Run>,
    kind: RunKind,
}

/// Where a run lives in the paragraph tree
#[derive(Clone, Debug)]
pub enum RunKind {
    /// Direct w:r child of w:p
    Plain,
    /// w:r inside a w:hyperlink
    Hyperlink(Node<Hyperlink>),
    /// w:r inside a w:fldSimple
    Field(Node<SimpleField>),
}

impl ParagraphRun {
    pub fn new(element: Node<Run>, kind: RunKind) -> Self {
        Self(Arc::new(RunView { element, kind }))
    }

    pub fn plain(element: Node<Run>) -> Self {
        Self::new(element, RunKind::Plain)
    }

    pub fn hyperlink(link: Node<Hyperlink>, element: Node<Run>) -> Self {
        Self::new(element, RunKind::Hyperlink(link))
    }

    /// Identity comparison
    pub fn is_same(&self, other: &ParagraphRun) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The underlying w:r element
    pub fn element(&self) -> &Node<Run> {
        &self.0.element
    }

    pub fn kind(&self) -> &RunKind {
        &self.0.kind
    }

    pub fn is_hyperlink(&self) -> bool {
        matches!(self.0.kind, RunKind::Hyperlink(_))
    }

    /// r:id of the enclosing hyperlink
    pub fn hyperlink_id(&self) -> Option<String> {
        match &self.0.kind {
            RunKind::Hyperlink(link) => link.read().r_id.clone(),
            _ => None,
        }
    }

    pub fn text(&self) -> String {
        self.0.element.read().text()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.0.element.write().set_text(text);
    }
}

/// Inline content control (w:sdt inside a paragraph)
#[derive(Clone, Debug)]
pub struct ContentControl(Node<RawXmlElement>);

impl ContentControl {
    pub fn new(element: Node<RawXmlElement>) -> Self {
        Self(element)
    }

    pub fn element(&self) -> &Node<RawXmlElement> {
        &self.0
    }

    pub fn is_same(&self, other: &ContentControl) -> bool {
        self.0.ptr_eq(&other.0)
    }

    pub fn text(&self) -> String {
        self.0.read().text()
    }
}

/// Entry of the paragraph's inline element list
#[derive(Clone, Debug)]
pub enum InlineElement {
    Run(ParagraphRun),
    ContentControl(ContentControl),
}

impl InlineElement {
    pub fn as_run(&self) -> Option<&ParagraphRun> {
        match self {
            InlineElement::Run(run) => Some(run),
            InlineElement::ContentControl(_) => None,
        }
    }

    /// Whether this entry is `run` (identity)
    pub fn is_run(&self, run: &ParagraphRun) -> bool {
        self.as_run().is_some_and(|r| r.is_same(run))
    }

    pub fn text(&self) -> String {
        match self {
            InlineElement::Run(run) => run.text(),
            InlineElement::ContentControl(sdt) => sdt.text(),
        }
    }
}
