//! Document root

use super::block::Block;
use super::chart::Chart;
use super::inline::plain_text;
use crate::codec;

/// The root of the tree: an ordered sequence of top-level blocks
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Document { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every chart in the tree, depth-first in document order
    pub fn charts(&self) -> Vec<&Chart> {
        let mut out = Vec::new();
        collect_charts(&self.blocks, &mut out);
        out
    }

    pub fn charts_mut(&mut self) -> Vec<&mut Chart> {
        let mut out = Vec::new();
        collect_charts_mut(&mut self.blocks, &mut out);
        out
    }

    /// The chart at a given position in [`Document::charts`] order
    pub fn chart_mut(&mut self, index: usize) -> Option<&mut Chart> {
        self.charts_mut().into_iter().nth(index)
    }

    /// Visible text of the whole tree, one block per line
    ///
    /// Pending charts show their pretty-printed configuration; live charts are pictures and
    /// contribute nothing.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        push_block_text(&self.blocks, &mut lines);
        lines.join("\n")
    }
}

fn collect_charts<'a>(blocks: &'a [Block], out: &mut Vec<&'a Chart>) {
    for block in blocks {
        if let Block::Chart(chart) = block {
            out.push(chart);
        }
        for children in block.child_groups() {
            collect_charts(children, out);
        }
    }
}

fn collect_charts_mut<'a>(blocks: &'a mut [Block], out: &mut Vec<&'a mut Chart>) {
    for block in blocks.iter_mut() {
        match block {
            Block::Chart(chart) => out.push(chart),
            other => {
                for children in other.child_groups_mut() {
                    collect_charts_mut(children, out);
                }
            }
        }
    }
}

fn push_block_text(blocks: &[Block], lines: &mut Vec<String>) {
    for block in blocks {
        match block {
            Block::Chart(Chart::Pending { payload }) => {
                if let Ok(pretty) = codec::decode_pretty(payload) {
                    lines.push(pretty);
                }
            }
            Block::Chart(Chart::Live { .. }) | Block::Rule | Block::Html(_) => {}
            Block::CodeBlock(code) => lines.push(code.literal.clone()),
            Block::List(_) | Block::BlockQuote(_) => {
                for children in block.child_groups() {
                    push_block_text(children, lines);
                }
            }
            other => {
                for inlines in other.inline_groups() {
                    lines.push(plain_text(inlines));
                }
            }
        }
    }
}
