//! Chart rendering seam
//!
//!     The conversion core never draws anything itself. A host supplies a [`ChartEngine`] that
//!     turns a decoded configuration into a [`ChartRendering`], and the mounter stores the
//!     resulting [`RenderingHandle`] on the live chart node.
//!
//!     At export time a rendering is flattened into a [`RasterImage`] by [`rasterize`]: the
//!     engine's own snapshot is preferred, the raw drawing surface is the fallback, and if
//!     neither is available the serializer writes a textual placeholder instead.
//!
//!     Handles are reference counted and single-threaded. Dropping the last node that holds a
//!     handle releases the rendering; engines must tolerate being abandoned at any point.

pub mod svg;

use crate::error::{RasterUnavailable, RenderError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Something that can mount a chart configuration
pub trait ChartEngine {
    fn mount(&self, config: &Value) -> Result<RenderingHandle, RenderError>;
}

/// A mounted chart instance
pub trait ChartRendering: fmt::Debug {
    /// A static image as produced by the engine's own export facility
    fn snapshot(&self) -> Option<RasterImage>;

    /// The raw drawing surface, used when no snapshot is available
    fn surface(&self) -> Option<RasterImage> {
        None
    }
}

/// Shared ownership of a mounted rendering
#[derive(Clone)]
pub struct RenderingHandle(Rc<dyn ChartRendering>);

impl RenderingHandle {
    pub fn new(rendering: impl ChartRendering + 'static) -> Self {
        RenderingHandle(Rc::new(rendering))
    }

    pub fn rendering(&self) -> &dyn ChartRendering {
        self.0.as_ref()
    }

    /// Number of live references, handy for checking that replaced trees release renderings
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl PartialEq for RenderingHandle {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for RenderingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RenderingHandle").field(&self.0).finish()
    }
}

/// An encoded still image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl RasterImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        RasterImage {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}

/// Flatten a rendering into a still image: snapshot first, then the raw surface
pub fn rasterize(handle: &RenderingHandle) -> Result<RasterImage, RasterUnavailable> {
    let rendering = handle.rendering();
    rendering
        .snapshot()
        .or_else(|| rendering.surface())
        .ok_or(RasterUnavailable)
}
