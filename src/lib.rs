//! # streamdoc
//!
//! A streaming Markdown document engine with embedded charts.
//!
//! Text arrives in chunks (typically from a model generating a reply). Every chunk is appended to
//! a buffer and the whole buffer is re-parsed into a [`Document`] tree, so the tree is always a
//! faithful picture of the text so far, even half-way through a fence or a table.
//!
//! ## Charts
//!
//! Fenced code blocks tagged ` ```chart ` or ` ```echarts ` whose body is valid JSON become
//! [`Chart`] nodes. A chart has two phases:
//!
//! - pending: the configuration shown as formatted text. Cheap; used while a stream is running.
//! - live: a widget mounted by a [`ChartEngine`]. Expensive; mounted lazily, one per tick.
//!
//! Both phases carry the configuration as a base64 encoded JSON string ([`codec`]), which is also
//! what the markup export stores in its `data-chart-option` attribute.
//!
//! ## Pipeline
//!
//! - [`stream`]: buffer chunks and re-parse on every append
//! - [`promote`]: turn pending charts into live ones when a stream ends
//! - [`mount`]: lazily attach renderings to live charts, cancelling on tree changes
//! - [`formats::html`]: serialize a tree to markup, rasterizing mounted charts
//! - [`formats::markdown`]: parse Markdown and export markup back to portable Markdown
//! - [`editor`]: the facade that wires all of the above together
//!
//! ## Testing
//!
//! The [`testing`] module carries fluent tree assertions, a stub chart engine and the sample
//! fixtures used across the test suite.

pub mod ast;
pub mod codec;
pub mod dom;
pub mod editor;
pub mod error;
pub mod format;
pub mod formats;
pub mod mount;
pub mod promote;
pub mod registry;
pub mod render;
pub mod settings;
pub mod stream;
pub mod testing;

pub use ast::{Block, Chart, Document, Inline};
pub use editor::{EditorOptions, MountPolicy, StreamEditor};
pub use error::{DecodeError, FormatError, RasterUnavailable, RenderError};
pub use format::Format;
pub use formats::html::serializer::{serialize_markup, MarkupOptions};
pub use formats::markdown::parser::{parse_markdown, ParseOptions};
pub use formats::markdown::to_portable_text;
pub use mount::{LazyWidgetMounter, MountStep, Revision};
pub use registry::FormatRegistry;
pub use render::svg::SvgChartEngine;
pub use render::{rasterize, ChartEngine, ChartRendering, RasterImage, RenderingHandle};
pub use stream::{Mode, StreamAssembler};
