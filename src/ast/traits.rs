//! AST traits - Common interfaces for uniform node access

use super::block::Block;
use super::inline::Inline;

/// Uniform read access to any node in the tree
pub trait AstNode {
    /// Node kind, e.g. "Paragraph" or "Chart"
    fn node_type(&self) -> &'static str;

    /// Short human label for tree dumps and assertion messages
    fn display_label(&self) -> String;
}

/// Visitor trait for traversing the tree
///
/// Default implementations are empty, so you only need to override the methods you care about.
/// Blocks are visited depth-first in document order; `leave_block` fires after a block's
/// children (list items, quoted blocks) have been walked.
pub trait Visitor {
    fn visit_block(&mut self, _block: &Block, _depth: usize) {}
    fn leave_block(&mut self, _block: &Block, _depth: usize) {}
    fn visit_inline(&mut self, _inline: &Inline, _depth: usize) {}
}

/// Walk a slice of blocks with a visitor
pub fn walk_blocks(visitor: &mut dyn Visitor, blocks: &[Block], depth: usize) {
    for block in blocks {
        visitor.visit_block(block, depth);
        for inlines in block.inline_groups() {
            walk_inlines(visitor, inlines, depth + 1);
        }
        for children in block.child_groups() {
            walk_blocks(visitor, children, depth + 1);
        }
        visitor.leave_block(block, depth);
    }
}

fn walk_inlines(visitor: &mut dyn Visitor, inlines: &[Inline], depth: usize) {
    for inline in inlines {
        visitor.visit_inline(inline, depth);
        if let Some(children) = inline.children() {
            walk_inlines(visitor, children, depth + 1);
        }
    }
}
