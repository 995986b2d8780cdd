//! Pending → live promotion
//!
//! When a feed stops streaming, every pending chart in the tree becomes an unmounted live chart
//! in place. Payloads are carried over untouched, so a chart whose carrier cannot be decoded is
//! still promoted; the mounter will skip it later.

use crate::ast::Document;

/// Promote every pending chart; returns how many were promoted
pub fn promote(doc: &mut Document) -> usize {
    let promoted = doc
        .charts_mut()
        .into_iter()
        .map(|chart| chart.promote())
        .filter(|promoted| *promoted)
        .count();
    tracing::debug!(promoted, "promoted pending charts");
    promoted
}
