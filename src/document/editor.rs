//! Hyperlink insertion and run swapping for a paragraph
//!
//! A hyperlink run needs both the paragraph and the relationship table of
//! the part that owns it: the URL is registered there and only the
//! relationship id is written into the paragraph.

use crate::document::{
    Hyperlink, Node, Paragraph, ParagraphContent, ParagraphRun, Run, RunKind,
};
use crate::error::{Error, Result};
use crate::opc::{rel_types, Relationships};
use log::{debug, warn};

/// Edits one paragraph together with the relationship table of its part.
///
/// Borrows both for the duration of the edit; obtain one from
/// [`Document::editor`](crate::Document::editor) or build it directly.
#[derive(Debug)]
pub struct ParagraphEditor<'a> {
    paragraph: &'a mut Paragraph,
    relationships: &'a mut Relationships,
}

impl<'a> ParagraphEditor<'a> {
    pub fn new(paragraph: &'a mut Paragraph, relationships: &'a mut Relationships) -> Self {
        Self {
            paragraph,
            relationships,
        }
    }

    pub fn paragraph(&self) -> &Paragraph {
        self.paragraph
    }

    pub fn paragraph_mut(&mut self) -> &mut Paragraph {
        self.paragraph
    }

    /// Append a hyperlink run pointing at `url`.
    ///
    /// Registers an external hyperlink relationship, appends a
    /// `w:hyperlink` holding one empty run as the last child of the
    /// paragraph, and appends the run to the run and inline lists.
    pub fn create_hyperlink_run(&mut self, url: &str) -> ParagraphRun {
        let (link, element) = self.new_hyperlink(url);
        self.paragraph
            .element()
            .push(ParagraphContent::Hyperlink(link.clone()));

        let run = ParagraphRun::hyperlink(link, element);
        self.paragraph.push_run_view(run.clone());
        run
    }

    /// Insert a hyperlink run pointing at `url` at run position `pos`.
    ///
    /// `pos` may range over `0..=runs().len()`. Outside that range nothing
    /// is registered or changed and `None` is returned.
    ///
    /// In the XML tree the new `w:hyperlink` goes before the child holding
    /// the run currently at `pos`: that `w:r`, or the hyperlink or field
    /// wrapping it. Without such a run it goes before the `pos`-th
    /// `w:r`/`w:hyperlink` child, or last. In the inline list it goes right
    /// before the run currently at `pos`, which is not necessarily inline
    /// index `pos` when content controls precede it.
    pub fn insert_new_hyperlink_run(&mut self, pos: usize, url: &str) -> Option<ParagraphRun> {
        let run_count = self.paragraph.runs().len();
        if pos > run_count {
            warn!(
                "hyperlink position {} out of range for {} runs, nothing inserted",
                pos, run_count
            );
            return None;
        }

        let anchor = self.paragraph.run(pos).map(|r| r.element().clone());
        let (link, element) = self.new_hyperlink(url);
        self.paragraph.element().insert_run_like(
            pos,
            anchor.as_ref(),
            ParagraphContent::Hyperlink(link.clone()),
        );

        let run = ParagraphRun::hyperlink(link, element);
        self.paragraph.insert_run_view(pos, run.clone());
        Some(run)
    }

    /// Swap `old` for `new`.
    ///
    /// The `r_index`-th direct `w:r` child of the paragraph is replaced by
    /// `new`'s element, then every entry of the run and inline lists that
    /// is `old` (by identity) becomes `new`, keeping its position. If `old`
    /// is in neither list only the XML child changes.
    ///
    /// `new` must be a [`RunKind::Plain`] run: it becomes a direct `w:r`.
    ///
    /// Fails with [`Error::NestedRun`](crate::Error::NestedRun) for a
    /// hyperlink or field run, and with
    /// [`Error::RunIndexOutOfBounds`](crate::Error::RunIndexOutOfBounds)
    /// when the paragraph has no direct run at `r_index`. Nothing is changed
    /// in either case.
    pub fn set_and_update_run(
        &mut self,
        new: &ParagraphRun,
        old: &ParagraphRun,
        r_index: usize,
    ) -> Result<()> {
        let placed = match new.kind() {
            RunKind::Plain => self
                .paragraph
                .element()
                .set_direct_run(r_index, new.element().clone()),
            RunKind::Hyperlink(_) => Err(Error::NestedRun("w:hyperlink")),
            RunKind::Field(_) => Err(Error::NestedRun("w:fldSimple")),
        };
        if let Err(e) = placed {
            warn!("run swap rejected: {}", e);
            return Err(e);
        }

        let replaced = self.paragraph.replace_run_view(new, old);
        debug!("swapped run at w:r index {}, {} view entries updated", r_index, replaced);
        Ok(())
    }

    /// Register `url` and build a hyperlink element with one empty run
    fn new_hyperlink(&mut self, url: &str) -> (Node<Hyperlink>, Node<Run>) {
        let r_id = self.relationships.add_external(rel_types::HYPERLINK, url);
        let mut link = Hyperlink::external(r_id);
        let element = link.add_new_run();
        (Node::new(link), element)
    }
}
