//! Lazy widget mounting
//!
//!     Mounting a chart is the one expensive step in the pipeline, and a document can hold many
//!     of them. Instead of mounting everything at once, the mounter keeps a queue of
//!     [`MountTask`]s and the host drains it one task per scheduling tick (typically one per
//!     animation frame), so the surface stays responsive while charts appear one by one.
//!
//! Revisions
//!
//!     The tree a task points into may be replaced before the task runs (the next chunk of a
//!     stream arrives, or the user edits the document). Every task is stamped with the
//!     [`Revision`] of the tree it was scheduled against; a tick with a newer revision drops the
//!     whole queue instead of mounting into the wrong node. Scheduling again always starts from
//!     an empty queue.
//!
//! Failures
//!
//!     A chart whose carrier does not decode, or whose configuration the engine rejects, is
//!     left without a rendering and the queue moves on. It shows up in exports in its pending
//!     form or as a placeholder.

use crate::ast::Document;
use crate::error::{DecodeError, RenderError};
use crate::render::ChartEngine;
use std::collections::VecDeque;

/// Version stamp of a document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Revision(pub u64);

impl Revision {
    pub fn next(self) -> Self {
        Revision(self.0.wrapping_add(1))
    }
}

/// Mount the chart at `index` (in document order) of the tree at `revision`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountTask {
    pub revision: Revision,
    pub index: usize,
}

/// Outcome of one tick
#[derive(Debug, Clone, PartialEq)]
pub enum MountStep {
    /// Nothing queued
    Idle,
    Mounted { index: usize },
    /// The carrier did not decode
    Skipped { index: usize, error: DecodeError },
    /// The engine rejected the configuration
    Failed { index: usize, error: RenderError },
    /// The target is no longer a live chart waiting for a rendering
    Stale { index: usize },
    /// The queue belonged to an older tree and was dropped
    Cancelled { dropped: usize },
}

#[derive(Debug, Default)]
pub struct LazyWidgetMounter {
    queue: VecDeque<MountTask>,
}

impl LazyWidgetMounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with one task per live chart that has no rendering yet
    pub fn mount_incremental(&mut self, doc: &Document, revision: Revision) -> usize {
        self.queue.clear();
        for (index, chart) in doc.charts().iter().enumerate() {
            if chart.needs_mount() {
                self.queue.push_back(MountTask { revision, index });
            }
        }
        tracing::trace!(queued = self.queue.len(), revision = revision.0, "scheduled chart mounts");
        self.queue.len()
    }

    /// Run exactly one queued task
    pub fn tick(
        &mut self,
        doc: &mut Document,
        revision: Revision,
        engine: &dyn ChartEngine,
    ) -> MountStep {
        let Some(task) = self.queue.pop_front() else {
            return MountStep::Idle;
        };

        if task.revision != revision {
            let dropped = self.queue.len() + 1;
            self.queue.clear();
            tracing::debug!(
                dropped,
                scheduled = task.revision.0,
                current = revision.0,
                "tree changed, dropping queued mounts"
            );
            return MountStep::Cancelled { dropped };
        }

        let index = task.index;
        let Some(chart) = doc.chart_mut(index).filter(|chart| chart.needs_mount()) else {
            return MountStep::Stale { index };
        };

        let config = match chart.decode() {
            Ok(config) => config,
            Err(error) => {
                tracing::debug!(index, error = %error, "skipping chart with unreadable payload");
                return MountStep::Skipped { index, error };
            }
        };

        match engine.mount(&config) {
            Ok(handle) => {
                chart.attach(handle);
                tracing::trace!(index, "mounted chart");
                MountStep::Mounted { index }
            }
            Err(error) => {
                tracing::debug!(index, error = %error, "chart engine refused configuration");
                MountStep::Failed { index, error }
            }
        }
    }

    /// Tick until the queue is empty; returns every non-idle step
    pub fn drain(
        &mut self,
        doc: &mut Document,
        revision: Revision,
        engine: &dyn ChartEngine,
    ) -> Vec<MountStep> {
        let mut steps = Vec::new();
        loop {
            match self.tick(doc, revision, engine) {
                MountStep::Idle => break,
                step => steps.push(step),
            }
        }
        steps
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn cancel(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Block, Chart};
    use crate::formats::markdown::parser::{parse_markdown, ParseOptions};
    use crate::testing::engine::StubEngine;
    use serde_json::json;

    const THREE_CHARTS: &str = "```chart\n{\"n\": 0}\n```\n\n```chart\n{\"n\": 1}\n```\n\n```chart\n{\"n\": 2}\n```\n";

    #[test]
    fn test_one_chart_per_tick_in_order() {
        let mut doc = parse_markdown(THREE_CHARTS, &ParseOptions::live());
        let engine = StubEngine::with_snapshot();
        let mut mounter = LazyWidgetMounter::new();
        let rev = Revision(1);

        assert_eq!(mounter.mount_incremental(&doc, rev), 3);
        assert_eq!(mounter.tick(&mut doc, rev, &engine), MountStep::Mounted { index: 0 });
        assert_eq!(mounter.pending(), 2);
        assert_eq!(engine.mounted(), vec![json!({ "n": 0 })]);

        let steps = mounter.drain(&mut doc, rev, &engine);
        assert_eq!(
            steps,
            vec![MountStep::Mounted { index: 1 }, MountStep::Mounted { index: 2 }]
        );
        assert!(mounter.is_idle());
        assert_eq!(mounter.tick(&mut doc, rev, &engine), MountStep::Idle);
        assert!(doc.charts().iter().all(|c| c.rendering().is_some()));
    }

    #[test]
    fn test_pending_and_mounted_charts_are_not_queued() {
        let mut doc = parse_markdown(THREE_CHARTS, &ParseOptions::live());
        let engine = StubEngine::with_snapshot();
        let handle = engine.mount(&json!({})).unwrap();
        doc.chart_mut(0).unwrap().attach(handle);
        doc.blocks.push(Block::Chart(Chart::pending(&json!({}))));

        let mut mounter = LazyWidgetMounter::new();
        assert_eq!(mounter.mount_incremental(&doc, Revision(0)), 2);
    }

    #[test]
    fn test_newer_revision_cancels_queue() {
        let mut doc = parse_markdown(THREE_CHARTS, &ParseOptions::live());
        let engine = StubEngine::with_snapshot();
        let mut mounter = LazyWidgetMounter::new();
        mounter.mount_incremental(&doc, Revision(1));

        let step = mounter.tick(&mut doc, Revision(2), &engine);
        assert_eq!(step, MountStep::Cancelled { dropped: 3 });
        assert!(mounter.is_idle());
        assert!(engine.mounted().is_empty());
        assert!(doc.charts().iter().all(|c| c.needs_mount()));
    }

    #[test]
    fn test_rescheduling_replaces_queue() {
        let doc = parse_markdown(THREE_CHARTS, &ParseOptions::live());
        let mut mounter = LazyWidgetMounter::new();
        mounter.mount_incremental(&doc, Revision(1));
        mounter.mount_incremental(&doc, Revision(2));
        assert_eq!(mounter.pending(), 3);
    }

    #[test]
    fn test_bad_payload_is_skipped_and_queue_continues() {
        let mut doc = parse_markdown(THREE_CHARTS, &ParseOptions::live());
        if let Block::Chart(Chart::Live { payload, .. }) = &mut doc.blocks[1] {
            *payload = "not base64!".to_string();
        }
        let engine = StubEngine::with_snapshot();
        let mut mounter = LazyWidgetMounter::new();
        mounter.mount_incremental(&doc, Revision(0));

        let steps = mounter.drain(&mut doc, Revision(0), &engine);
        assert_eq!(steps.len(), 3);
        assert!(matches!(steps[1], MountStep::Skipped { index: 1, .. }));
        assert!(doc.charts()[1].needs_mount());
        assert!(doc.charts()[2].rendering().is_some());
    }

    #[test]
    fn test_engine_failure_leaves_chart_unmounted() {
        let mut doc = parse_markdown("```chart\n{\"reject\": true}\n```", &ParseOptions::live());
        let engine = StubEngine::with_snapshot();
        let mut mounter = LazyWidgetMounter::new();
        mounter.mount_incremental(&doc, Revision(0));
        assert!(matches!(
            mounter.tick(&mut doc, Revision(0), &engine),
            MountStep::Failed { index: 0, .. }
        ));
        assert!(doc.charts()[0].needs_mount());
    }

    #[test]
    fn test_stale_target() {
        let mut doc = parse_markdown(THREE_CHARTS, &ParseOptions::live());
        let engine = StubEngine::with_snapshot();
        let mut mounter = LazyWidgetMounter::new();
        mounter.mount_incremental(&doc, Revision(0));
        doc.blocks.truncate(1);

        assert_eq!(mounter.tick(&mut doc, Revision(0), &engine), MountStep::Mounted { index: 0 });
        assert_eq!(mounter.tick(&mut doc, Revision(0), &engine), MountStep::Stale { index: 1 });
    }
}
