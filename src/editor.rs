//! Editor facade
//!
//!     [`StreamEditor`] is what a presentation layer talks to. It ties the pieces together:
//!
//!         chunk ──▶ StreamAssembler ──▶ tree ──▶ LazyWidgetMounter ──▶ mounted tree
//!                                                                        │
//!                              Markdown ◀── exporter ◀── markup ◀── serializer
//!
//!     The editor owns the current tree and bumps its [`Revision`] every time the tree is
//!     replaced or handed out mutably, so mounts queued against an older tree are dropped
//!     instead of landing in the wrong node.
//!
//! Modes
//!
//!     In [`Mode::Streaming`] every chunk re-parses the buffer with pending charts. Switching to
//!     [`Mode::Interactive`] promotes those charts in place and schedules their mounting. Appends
//!     made while interactive parse charts as live widgets straight away.
//!
//! Mounting
//!
//!     With [`MountPolicy::PerTick`] the host calls [`StreamEditor::tick`] once per frame. With
//!     [`MountPolicy::Eager`] the editor drains the queue as soon as it schedules it, which
//!     suits hosts without a frame loop (the CLI, tests).

use crate::ast::Document;
use crate::formats::html::serializer::{serialize_markup, MarkupOptions};
use crate::formats::markdown::exporter;
use crate::formats::markdown::parser::{parse_markdown, ParseOptions};
use crate::mount::{LazyWidgetMounter, MountStep, Revision};
use crate::promote::promote;
use crate::render::ChartEngine;
use crate::stream::{Mode, StreamAssembler};
use serde::Deserialize;

/// When queued chart mounts run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MountPolicy {
    /// One mount per [`StreamEditor::tick`]
    #[default]
    PerTick,
    /// Drain the queue right after scheduling
    Eager,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    pub chart_enabled: bool,
    pub mount_policy: MountPolicy,
    pub markup: MarkupOptions,
}

impl Default for EditorOptions {
    fn default() -> Self {
        EditorOptions {
            chart_enabled: true,
            mount_policy: MountPolicy::default(),
            markup: MarkupOptions::default(),
        }
    }
}

pub struct StreamEditor {
    options: EditorOptions,
    assembler: StreamAssembler,
    document: Document,
    revision: Revision,
    mode: Mode,
    mounter: LazyWidgetMounter,
    engine: Box<dyn ChartEngine>,
}

impl StreamEditor {
    pub fn new(options: EditorOptions, engine: impl ChartEngine + 'static) -> Self {
        StreamEditor {
            assembler: StreamAssembler::new(options.chart_enabled),
            options,
            document: Document::default(),
            revision: Revision::default(),
            mode: Mode::default(),
            mounter: LazyWidgetMounter::new(),
            engine: Box::new(engine),
        }
    }

    /// Append a chunk of the feed and replace the tree with a parse of the whole buffer
    pub fn append(&mut self, chunk: &str) {
        let doc = self.assembler.append(chunk, self.mode);
        self.replace_document(doc);
    }

    /// Like [`append`](Self::append) for raw bytes; returns false if the chunk was ignored
    pub fn append_bytes(&mut self, bytes: &[u8]) -> bool {
        match self.assembler.append_bytes(bytes, self.mode) {
            Some(doc) => {
                self.replace_document(doc);
                true
            }
            None => false,
        }
    }

    /// Clear the stream buffer. The current tree stays until the next append.
    pub fn reset(&mut self) {
        self.assembler.reset();
    }

    pub fn current_text(&self) -> &str {
        self.assembler.current_buffer()
    }

    /// Parse `markdown` with live charts and make it the whole document
    ///
    /// The stream buffer is left alone.
    pub fn set_full_text(&mut self, markdown: &str) {
        let doc = parse_markdown(markdown, &self.live_options());
        self.replace_document(doc);
    }

    /// Parse a Markdown fragment and add its blocks after the existing content
    pub fn append_markdown(&mut self, markdown: &str) {
        let markdown = markdown.trim();
        if markdown.is_empty() {
            return;
        }
        let fragment = parse_markdown(markdown, &self.live_options());
        self.document.blocks.extend(fragment.blocks);
        self.revision = self.revision.next();
        self.schedule_mounts();
    }

    /// Empty the document and the stream buffer
    pub fn clear(&mut self) {
        self.assembler.reset();
        self.mounter.cancel();
        self.document = Document::default();
        self.revision = self.revision.next();
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch modes; leaving streaming promotes pending charts and schedules their mounts
    pub fn set_mode(&mut self, mode: Mode) {
        let leaving_stream = self.mode == Mode::Streaming && mode == Mode::Interactive;
        self.mode = mode;
        if leaving_stream {
            promote(&mut self.document);
            self.revision = self.revision.next();
            self.schedule_mounts();
        }
    }

    /// Run one queued mount
    pub fn tick(&mut self) -> MountStep {
        self.mounter
            .tick(&mut self.document, self.revision, self.engine.as_ref())
    }

    /// Run every queued mount
    pub fn drain_mounts(&mut self) -> Vec<MountStep> {
        self.mounter
            .drain(&mut self.document, self.revision, self.engine.as_ref())
    }

    /// Queue mounts for the current tree, e.g. after editing it through `document_mut`
    pub fn mount_incremental(&mut self) -> usize {
        self.schedule_mounts()
    }

    pub fn pending_mounts(&self) -> usize {
        self.mounter.pending()
    }

    pub fn to_markup(&self) -> String {
        serialize_markup(&self.document, &self.options.markup)
    }

    pub fn to_portable_text(&self) -> String {
        exporter::to_portable_text(&self.to_markup())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for an editing surface; invalidates queued mounts
    pub fn document_mut(&mut self) -> &mut Document {
        self.revision = self.revision.next();
        &mut self.document
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Non-whitespace characters of the visible text
    pub fn word_count(&self) -> usize {
        self.document
            .plain_text()
            .chars()
            .filter(|c| !c.is_whitespace())
            .count()
    }

    fn live_options(&self) -> ParseOptions {
        ParseOptions::live().with_charts(self.options.chart_enabled)
    }

    fn replace_document(&mut self, doc: Document) {
        self.document = doc;
        self.revision = self.revision.next();
        self.schedule_mounts();
    }

    fn schedule_mounts(&mut self) -> usize {
        let queued = self.mounter.mount_incremental(&self.document, self.revision);
        if self.options.mount_policy == MountPolicy::Eager {
            self.drain_mounts();
        }
        queued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_doc;
    use crate::testing::engine::StubEngine;

    fn editor(policy: MountPolicy) -> StreamEditor {
        let options = EditorOptions {
            mount_policy: policy,
            ..EditorOptions::default()
        };
        StreamEditor::new(options, StubEngine::with_snapshot())
    }

    #[test]
    fn test_streaming_then_interactive() {
        let mut ed = editor(MountPolicy::PerTick);
        ed.set_mode(Mode::Streaming);
        for chunk in ["# T\n\n```echarts\n{\"a\"", ": 1}\n```\n"] {
            ed.append(chunk);
        }
        assert_doc(ed.document()).chart(0, |c| {
            c.is_pending();
        });
        assert_eq!(ed.pending_mounts(), 0);

        ed.set_mode(Mode::Interactive);
        assert_eq!(ed.pending_mounts(), 1);
        assert_eq!(ed.tick(), MountStep::Mounted { index: 0 });
        assert_doc(ed.document()).all_charts_mounted();
    }

    #[test]
    fn test_set_mode_without_transition_does_not_promote() {
        let mut ed = editor(MountPolicy::PerTick);
        ed.set_mode(Mode::Streaming);
        ed.append("```chart\n{}\n```");
        ed.set_mode(Mode::Streaming);
        assert!(ed.document().charts()[0].is_pending());
    }

    #[test]
    fn test_eager_policy_mounts_immediately() {
        let mut ed = editor(MountPolicy::Eager);
        ed.set_full_text("```chart\n{}\n```\n\n```chart\n{}\n```");
        assert_eq!(ed.pending_mounts(), 0);
        assert_doc(ed.document()).chart_count(2).all_charts_mounted();
    }

    #[test]
    fn test_set_full_text_leaves_buffer() {
        let mut ed = editor(MountPolicy::PerTick);
        ed.append("streamed");
        ed.set_full_text("# Other");
        assert_eq!(ed.current_text(), "streamed");
        assert_doc(ed.document()).block(0, |b| {
            b.assert_heading().text("Other");
        });
    }

    #[test]
    fn test_document_mut_cancels_queued_mounts() {
        let mut ed = editor(MountPolicy::PerTick);
        ed.set_full_text("```chart\n{}\n```");
        ed.document_mut();
        assert!(matches!(ed.tick(), MountStep::Cancelled { dropped: 1 }));
        assert_eq!(ed.mount_incremental(), 1);
        assert_eq!(ed.tick(), MountStep::Mounted { index: 0 });
    }

    #[test]
    fn test_append_markdown_keeps_existing_blocks() {
        let mut ed = editor(MountPolicy::Eager);
        ed.set_full_text("# A");
        ed.append_markdown("   ");
        ed.append_markdown("\n\nsecond\n\n```chart\n{}\n```\n");
        assert_doc(ed.document())
            .block_count(3)
            .block(1, |b| {
                b.assert_paragraph().text("second");
            })
            .all_charts_mounted();
    }

    #[test]
    fn test_clear() {
        let mut ed = editor(MountPolicy::PerTick);
        ed.append("# A\n\n```chart\n{}\n```");
        ed.clear();
        assert!(ed.document().is_empty());
        assert_eq!(ed.current_text(), "");
        assert_eq!(ed.tick(), MountStep::Idle);
    }

    #[test]
    fn test_word_count() {
        let mut ed = editor(MountPolicy::PerTick);
        ed.set_full_text("# Hi there\n\n- a b\n");
        assert_eq!(ed.word_count(), 9);
    }

    #[test]
    fn test_revision_advances_on_every_replacement() {
        let mut ed = editor(MountPolicy::PerTick);
        let start = ed.revision();
        ed.append("a");
        ed.append("b");
        assert_eq!(ed.revision(), start.next().next());
    }

    #[test]
    fn test_charts_disabled() {
        let options = EditorOptions {
            chart_enabled: false,
            ..EditorOptions::default()
        };
        let mut ed = StreamEditor::new(options, StubEngine::with_snapshot());
        ed.set_full_text("```echarts\n{}\n```");
        assert_doc(ed.document()).chart_count(0).block(0, |b| {
            b.assert_code().language("echarts");
        });
    }
}
