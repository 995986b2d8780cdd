//! Error types
//!
//!     Every error kind the conversion core can produce. None of them are fatal: the codec,
//!     mounter and serializers recover locally and degrade to some valid output. Only
//!     [`FormatError`] (registry lookups) and configuration errors ever reach a caller.

use std::fmt;

/// A chart carrier string that could not be turned back into a configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Not valid base64 (malformed or truncated)
    Base64(String),
    /// Decoded bytes are not UTF-8
    Utf8(String),
    /// Decoded text is not JSON
    Json(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Base64(msg) => write!(f, "Invalid chart carrier encoding: {}", msg),
            DecodeError::Utf8(msg) => write!(f, "Chart carrier is not UTF-8 text: {}", msg),
            DecodeError::Json(msg) => write!(f, "Chart carrier is not a JSON document: {}", msg),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<base64::DecodeError> for DecodeError {
    fn from(err: base64::DecodeError) -> Self {
        DecodeError::Base64(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for DecodeError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        DecodeError::Utf8(err.to_string())
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err.to_string())
    }
}

/// The chart engine refused to mount a configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The configuration has a shape the engine cannot draw
    InvalidOption(String),
    /// The engine failed for reasons of its own
    Engine(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidOption(msg) => write!(f, "Invalid chart option: {}", msg),
            RenderError::Engine(msg) => write!(f, "Chart engine error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// Neither a snapshot nor a raw surface could be obtained from a rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterUnavailable;

impl fmt::Display for RasterUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No raster image available for chart")
    }
}

impl std::error::Error for RasterUnavailable {}

/// Errors surfaced by the format registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Format not found in registry
    FormatNotFound(String),
    /// The format does not support the requested direction
    NotSupported(String),
    /// Error while parsing source text
    ParseError(String),
    /// Error while serializing a document
    SerializationError(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::FormatNotFound(name) => write!(f, "Format '{}' not found", name),
            FormatError::NotSupported(msg) => write!(f, "Not supported: {}", msg),
            FormatError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            FormatError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}
