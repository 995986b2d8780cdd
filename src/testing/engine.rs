//! A chart engine for tests

use crate::error::RenderError;
use crate::render::{ChartEngine, ChartRendering, RasterImage, RenderingHandle};
use serde_json::Value;
use std::cell::RefCell;

/// Which raster sources a stub rendering offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubRaster {
    /// `snapshot()` returns a PNG
    Snapshot,
    /// only `surface()` returns an image (a BMP)
    SurfaceOnly,
    /// neither source is available
    Blank,
}

/// Records every configuration it mounts. Rejects configs with `"reject": true`.
#[derive(Debug)]
pub struct StubEngine {
    raster: StubRaster,
    mounted: RefCell<Vec<Value>>,
}

impl StubEngine {
    pub fn new(raster: StubRaster) -> Self {
        StubEngine {
            raster,
            mounted: RefCell::new(Vec::new()),
        }
    }

    pub fn with_snapshot() -> Self {
        Self::new(StubRaster::Snapshot)
    }

    pub fn surface_only() -> Self {
        Self::new(StubRaster::SurfaceOnly)
    }

    pub fn blank() -> Self {
        Self::new(StubRaster::Blank)
    }

    /// Configurations mounted so far, in mount order
    pub fn mounted(&self) -> Vec<Value> {
        self.mounted.borrow().clone()
    }
}

impl ChartEngine for StubEngine {
    fn mount(&self, config: &Value) -> Result<RenderingHandle, RenderError> {
        if config.get("reject").and_then(Value::as_bool) == Some(true) {
            return Err(RenderError::InvalidOption("rejected by stub".to_string()));
        }
        self.mounted.borrow_mut().push(config.clone());
        Ok(RenderingHandle::new(StubRendering {
            raster: self.raster,
        }))
    }
}

#[derive(Debug)]
struct StubRendering {
    raster: StubRaster,
}

impl ChartRendering for StubRendering {
    fn snapshot(&self) -> Option<RasterImage> {
        match self.raster {
            StubRaster::Snapshot => Some(RasterImage::new("image/png", b"png".to_vec())),
            _ => None,
        }
    }

    fn surface(&self) -> Option<RasterImage> {
        match self.raster {
            StubRaster::Blank => None,
            _ => Some(RasterImage::new("image/bmp", b"bmp".to_vec())),
        }
    }
}
