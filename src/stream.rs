//! Streaming text assembly
//!
//!     A feed arrives as a sequence of chunks (for example, tokens from a text generator). The
//!     assembler keeps the concatenation of every chunk since the last reset and, on each new
//!     chunk, parses that whole buffer again. There is no diffing: the tree handed back after a
//!     chunk is exactly what a one-shot parse of the buffer would give, so the display can
//!     never drift from the text. The price is O(buffer) work per chunk.
//!
//!     Half-finished constructs are expected mid-stream. An unclosed code fence is simply a
//!     code block running to the end of the buffer until its closing fence arrives, and a chart
//!     fence whose body is not yet valid JSON stays a plain code block.

use crate::ast::Document;
use crate::formats::markdown::parser::{parse_markdown, ParseOptions};
use serde::Deserialize;

/// Whether a feed is still arriving
///
/// While streaming, charts are parsed as pending nodes so that no widget is mounted for a
/// configuration that may still be growing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Streaming,
    #[default]
    Interactive,
}

/// Owns the append-only text buffer of a feed
#[derive(Debug, Clone)]
pub struct StreamAssembler {
    buffer: String,
    chart_enabled: bool,
}

impl Default for StreamAssembler {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StreamAssembler {
    pub fn new(chart_enabled: bool) -> Self {
        StreamAssembler {
            buffer: String::new(),
            chart_enabled,
        }
    }

    /// Append a chunk and return the tree for the whole buffer
    pub fn append(&mut self, chunk: &str, mode: Mode) -> Document {
        self.buffer.push_str(chunk);
        tracing::trace!(
            chunk_len = chunk.len(),
            buffer_len = self.buffer.len(),
            ?mode,
            "re-parsing stream buffer"
        );
        self.reparse(mode)
    }

    /// Append a raw chunk; chunks that are not UTF-8 are ignored and leave the buffer untouched
    pub fn append_bytes(&mut self, bytes: &[u8], mode: Mode) -> Option<Document> {
        match std::str::from_utf8(bytes) {
            Ok(chunk) => Some(self.append(chunk, mode)),
            Err(e) => {
                tracing::debug!(error = %e, len = bytes.len(), "ignoring chunk that is not UTF-8");
                None
            }
        }
    }

    /// Parse the current buffer without appending
    pub fn reparse(&self, mode: Mode) -> Document {
        parse_markdown(&self.buffer, &self.options_for(mode))
    }

    pub fn options_for(&self, mode: Mode) -> ParseOptions {
        ParseOptions {
            chart_enabled: self.chart_enabled,
            chart_as_live_widget: mode != Mode::Streaming,
        }
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    pub fn current_buffer(&self) -> &str {
        &self.buffer
    }
}

/// Split text into chunks of `chunk_size` characters, for simulated feeds
///
/// Chunks never split a character. A size of zero is treated as one.
pub fn replay_chunks(text: &str, chunk_size: usize) -> Vec<&str> {
    let size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (index, _) in text.char_indices() {
        if count == size {
            chunks.push(&text[start..index]);
            start = index;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}
