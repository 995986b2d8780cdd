//! Document tree
//!
//!     The tree every other module reads and writes. It is an ordered forest of [`Block`]s,
//!     some of which hold [`Inline`] runs. A tree is always the product of one full parse of
//!     a text buffer: nothing here knows how to patch itself incrementally, and every chunk or
//!     "set full text" call builds a fresh tree that replaces the previous one wholesale.
//!
//!     Charts are the only stateful nodes. See [`chart`] for their two-phase lifecycle.

pub mod block;
pub mod chart;
pub mod document;
pub mod inline;
pub mod traits;

pub use block::{Alignment, Block, BlockQuote, CodeBlock, Heading, List, ListItem, Paragraph};
pub use block::{Table, TableCell};
pub use chart::Chart;
pub use document::Document;
pub use inline::{Image, Inline, Link};
pub use traits::{AstNode, Visitor};
