//! The w:p child list and its tree lock

use crate::document::{Hyperlink, Node, Run, SimpleField};
use crate::error::{Error, Result};
use crate::xml::{RawXmlElement, RawXmlNode};
use log::debug;
use parking_lot::{Mutex, MutexGuard};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Writer;
use std::fmt;
use std::sync::Arc;

/// Child element of a paragraph (w:p)
#[derive(Debug)]
pub enum ParagraphContent {
    /// w:r
    Run(Node<Run>),
    /// w:hyperlink
    Hyperlink(Node<Hyperlink>),
    /// w:fldSimple
    Field(Node<SimpleField>),
    /// Inline w:sdt, kept raw
    ContentControl(Node<RawXmlElement>),
    BookmarkStart { id: String, name: String },
    BookmarkEnd { id: String },
    Unknown(RawXmlNode),
}

impl ParagraphContent {
    /// Whether this child counts as a run position in the XML tree.
    ///
    /// Only w:r and w:hyperlink do; fields, content controls and bookmarks
    /// are skipped when mapping a run position to a child index.
    pub fn is_run_like(&self) -> bool {
        matches!(self, ParagraphContent::Run(_) | ParagraphContent::Hyperlink(_))
    }

    /// Whether `run` is this child or one of its nested runs
    pub fn holds_run(&self, run: &Node<Run>) -> bool {
        match self {
            ParagraphContent::Run(r) => r.ptr_eq(run),
            ParagraphContent::Hyperlink(link) => link.read().runs.iter().any(|r| r.ptr_eq(run)),
            ParagraphContent::Field(field) => field.read().runs.iter().any(|r| r.ptr_eq(run)),
            _ => false,
        }
    }

    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            ParagraphContent::Run(run) => run.read().write_to(writer),
            ParagraphContent::Hyperlink(link) => link.read().write_to(writer),
            ParagraphContent::Field(field) => field.read().write_to(writer),
            ParagraphContent::ContentControl(sdt) => sdt.read().write_to(writer),
            ParagraphContent::BookmarkStart { id, name } => {
                let mut elem = BytesStart::new("w:bookmarkStart");
                elem.push_attribute(("w:id", id.as_str()));
                elem.push_attribute(("w:name", name.as_str()));
                writer.write_event(Event::Empty(elem))?;
                Ok(())
            }
            ParagraphContent::BookmarkEnd { id } => {
                let mut elem = BytesStart::new("w:bookmarkEnd");
                elem.push_attribute(("w:id", id.as_str()));
                writer.write_event(Event::Empty(elem))?;
                Ok(())
            }
            ParagraphContent::Unknown(node) => node.write_to(writer),
        }
    }
}

/// The child list of a w:p element.
///
/// Cloning shares the list. Every structural edit (insert, replace, remove
/// at a computed position) runs while holding the list's lock, so edits
/// through different handles to the same paragraph are serialized.
#[derive(Clone, Default)]
pub struct ParagraphElement(Arc<Mutex<Vec<ParagraphContent>>>);

impl ParagraphElement {
    pub fn new(children: Vec<ParagraphContent>) -> Self {
        Self(Arc::new(Mutex::new(children)))
    }

    /// Lock the child list for reading or editing
    pub fn lock(&self) -> MutexGuard<'_, Vec<ParagraphContent>> {
        self.0.lock()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Append as the last child
    pub fn push(&self, child: ParagraphContent) {
        self.lock().push(child);
    }

    /// Insert `child` at run position `pos`.
    ///
    /// `anchor` is the run currently at `pos`. When the tree holds it, the
    /// child goes directly before the anchor's `w:r`, or before the
    /// `w:hyperlink`/`w:fldSimple` wrapping it. Otherwise the child goes
    /// before the `pos`-th run-like child (see
    /// [`ParagraphContent::is_run_like`]), and when there are not that many
    /// it is appended after the last child. Returns the child index used.
    pub fn insert_run_like(
        &self,
        pos: usize,
        anchor: Option<&Node<Run>>,
        child: ParagraphContent,
    ) -> usize {
        let mut children = self.lock();
        let index = anchor
            .and_then(|run| children.iter().position(|c| c.holds_run(run)))
            .or_else(|| {
                children
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.is_run_like())
                    .nth(pos)
                    .map(|(i, _)| i)
            })
            .unwrap_or(children.len());
        children.insert(index, child);
        debug!("inserted paragraph child at index {} (run position {})", index, pos);
        index
    }

    /// Number of direct w:r children
    pub fn direct_run_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|c| matches!(c, ParagraphContent::Run(_)))
            .count()
    }

    /// Replace the `index`-th direct w:r child with `run`
    pub fn set_direct_run(&self, index: usize, run: Node<Run>) -> Result<()> {
        let mut children = self.lock();
        let len = children
            .iter()
            .filter(|c| matches!(c, ParagraphContent::Run(_)))
            .count();
        let slot = children
            .iter_mut()
            .filter_map(|c| match c {
                ParagraphContent::Run(r) => Some(r),
                _ => None,
            })
            .nth(index)
            .ok_or(Error::RunIndexOutOfBounds { index, len })?;
        *slot = run;
        Ok(())
    }

    /// Detach `run` from the tree.
    ///
    /// Looks at direct w:r children and at runs nested in hyperlinks and
    /// fields. A container left without runs is removed as well.
    pub fn remove_run(&self, run: &Node<Run>) -> bool {
        let mut children = self.lock();
        let mut emptied = None;
        let mut found = false;

        for (i, child) in children.iter().enumerate() {
            let removed = match child {
                ParagraphContent::Run(r) if r.ptr_eq(run) => {
                    emptied = Some(i);
                    true
                }
                ParagraphContent::Hyperlink(link) => {
                    let mut link = link.write();
                    let removed = detach(&mut link.runs, run);
                    if removed && link.runs.is_empty() {
                        emptied = Some(i);
                    }
                    removed
                }
                ParagraphContent::Field(field) => {
                    let mut field = field.write();
                    let removed = detach(&mut field.runs, run);
                    if removed && field.runs.is_empty() {
                        emptied = Some(i);
                    }
                    removed
                }
                _ => false,
            };
            if removed {
                found = true;
                break;
            }
        }

        if let Some(i) = emptied {
            children.remove(i);
        }
        found
    }

    pub fn write_children<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        for child in self.lock().iter() {
            child.write_to(writer)?;
        }
        Ok(())
    }
}

fn detach(runs: &mut Vec<Node<Run>>, run: &Node<Run>) -> bool {
    match runs.iter().position(|r| r.ptr_eq(run)) {
        Some(pos) => {
            runs.remove(pos);
            true
        }
        None => false,
    }
}

impl fmt::Debug for ParagraphElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_lock() {
            Some(children) => f.debug_list().entries(children.iter()).finish(),
            None => f.write_str("[<locked>]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn kinds(element: &ParagraphElement) -> Vec<&'static str> {
        element
            .lock()
            .iter()
            .map(|c| match c {
                ParagraphContent::Run(_) => "r",
                ParagraphContent::Hyperlink(_) => "hyperlink",
                ParagraphContent::Field(_) => "fldSimple",
                ParagraphContent::ContentControl(_) => "sdt",
                ParagraphContent::BookmarkStart { .. } => "bookmarkStart",
                ParagraphContent::BookmarkEnd { .. } => "bookmarkEnd",
                ParagraphContent::Unknown(_) => "unknown",
            })
            .collect()
    }

    fn run() -> ParagraphContent {
        ParagraphContent::Run(Node::new(Run::default()))
    }

    fn link() -> ParagraphContent {
        ParagraphContent::Hyperlink(Node::new(Hyperlink::external("rId1")))
    }

    #[test]
    fn test_insert_skips_non_run_children() {
        let element = ParagraphElement::new(vec![
            ParagraphContent::BookmarkStart {
                id: "0".into(),
                name: "b".into(),
            },
            run(),
            ParagraphContent::ContentControl(Node::new(RawXmlElement::new("w:sdt"))),
            run(),
        ]);

        assert_eq!(element.insert_run_like(1, None, link()), 3);
        assert_eq!(
            kinds(&element),
            vec!["bookmarkStart", "r", "sdt", "hyperlink", "r"]
        );
    }

    #[test]
    fn test_insert_at_zero_goes_before_first_run() {
        let element = ParagraphElement::new(vec![
            ParagraphContent::BookmarkStart {
                id: "0".into(),
                name: "b".into(),
            },
            run(),
        ]);
        assert_eq!(element.insert_run_like(0, None, link()), 1);
    }

    #[test]
    fn test_insert_past_last_run_appends() {
        let element = ParagraphElement::new(vec![
            run(),
            ParagraphContent::BookmarkEnd { id: "0".into() },
        ]);
        assert_eq!(element.insert_run_like(1, None, link()), 2);
        assert_eq!(kinds(&element), vec!["r", "bookmarkEnd", "hyperlink"]);
    }

    #[test]
    fn test_insert_before_run_after_multi_run_hyperlink() {
        let mut hyperlink = Hyperlink::external("rId1");
        hyperlink.add_new_run();
        hyperlink.add_new_run();
        let c = Node::new(Run::new("C"));
        let element = ParagraphElement::new(vec![
            ParagraphContent::Hyperlink(Node::new(hyperlink)),
            ParagraphContent::Run(c.clone()),
        ]);

        // run position 2 is C; counting run-like children would append
        assert_eq!(element.insert_run_like(2, Some(&c), link()), 1);
        assert_eq!(kinds(&element), vec!["hyperlink", "hyperlink", "r"]);
    }

    #[test]
    fn test_insert_before_field_holding_anchor() {
        let mut field = SimpleField::default();
        let nested = Node::new(Run::new("3"));
        field.runs.push(nested.clone());
        let element = ParagraphElement::new(vec![run(), ParagraphContent::Field(Node::new(field))]);

        assert_eq!(element.insert_run_like(1, Some(&nested), link()), 1);
        assert_eq!(kinds(&element), vec!["r", "hyperlink", "fldSimple"]);
    }

    #[test]
    fn test_unknown_anchor_falls_back_to_counting() {
        let stranger = Node::new(Run::default());
        let element = ParagraphElement::new(vec![run(), run()]);
        assert_eq!(element.insert_run_like(1, Some(&stranger), link()), 1);
    }

    #[test]
    fn test_set_direct_run_counts_only_direct_runs() {
        let replacement = Node::new(Run::new("new"));
        let element = ParagraphElement::new(vec![link(), run(), run()]);

        element.set_direct_run(1, replacement.clone()).unwrap();
        match &element.lock()[2] {
            ParagraphContent::Run(r) => assert!(r.ptr_eq(&replacement)),
            other => panic!("unexpected child {other:?}"),
        }

        assert!(matches!(
            element.set_direct_run(2, replacement),
            Err(Error::RunIndexOutOfBounds { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_remove_nested_run_drops_empty_hyperlink() {
        let mut hyperlink = Hyperlink::external("rId1");
        let nested = hyperlink.add_new_run();
        let element = ParagraphElement::new(vec![
            run(),
            ParagraphContent::Hyperlink(Node::new(hyperlink)),
        ]);

        assert!(element.remove_run(&nested));
        assert_eq!(kinds(&element), vec!["r"]);
        assert!(!element.remove_run(&nested));
    }

    #[test]
    fn test_concurrent_structural_inserts() {
        let element = ParagraphElement::default();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let element = element.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        element.insert_run_like(0, None, run());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(element.direct_run_count(), 200);
    }
}
