//! Format implementations
//!
//! Conversions between the document tree and its text representations.

pub mod html;
pub mod markdown;
pub mod treeviz;

pub use html::HtmlFormat;
pub use markdown::MarkdownFormat;
pub use treeviz::TreevizFormat;
