//! Chart nodes
//!
//!     A chart starts life as the JSON body of a fenced code block tagged `chart` or `echarts`.
//!     Once parsed, its configuration is only ever held as a carrier string (see [`crate::codec`])
//!     and moves through two phases:
//!
//!         Pending  ──promote──▶  Live { rendering: None }  ──mount──▶  Live { rendering: Some }
//!
//!     Pending charts are produced while a feed is still streaming. They display as a read-only
//!     code block and do nothing else. Live charts are widgets: the mounter attaches a rendering
//!     handle to them, one per scheduling tick. The handle belongs to the node; replacing the
//!     tree drops it, and there is no explicit unmount.

use super::traits::AstNode;
use crate::codec;
use crate::error::DecodeError;
use crate::render::RenderingHandle;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Pending {
        payload: String,
    },
    Live {
        payload: String,
        rendering: Option<RenderingHandle>,
    },
}

impl Chart {
    pub fn pending(config: &Value) -> Self {
        Chart::Pending {
            payload: codec::encode(config),
        }
    }

    pub fn live(config: &Value) -> Self {
        Chart::Live {
            payload: codec::encode(config),
            rendering: None,
        }
    }

    /// The carrier string, identical in both phases
    pub fn payload(&self) -> &str {
        match self {
            Chart::Pending { payload } | Chart::Live { payload, .. } => payload,
        }
    }

    pub fn decode(&self) -> Result<Value, DecodeError> {
        codec::decode(self.payload())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Chart::Pending { .. })
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Chart::Live { .. })
    }

    pub fn rendering(&self) -> Option<&RenderingHandle> {
        match self {
            Chart::Live { rendering, .. } => rendering.as_ref(),
            Chart::Pending { .. } => None,
        }
    }

    /// A live chart that has not been mounted yet
    pub fn needs_mount(&self) -> bool {
        matches!(self, Chart::Live { rendering: None, .. })
    }

    /// Turn a pending chart into an unmounted live chart; returns false if already live
    pub fn promote(&mut self) -> bool {
        match self {
            Chart::Pending { payload } => {
                let payload = std::mem::take(payload);
                *self = Chart::Live {
                    payload,
                    rendering: None,
                };
                true
            }
            Chart::Live { .. } => false,
        }
    }

    /// Attach a rendering to a live chart. Pending charts cannot hold one.
    pub fn attach(&mut self, handle: RenderingHandle) -> bool {
        match self {
            Chart::Live { rendering, .. } => {
                *rendering = Some(handle);
                true
            }
            Chart::Pending { .. } => false,
        }
    }
}

impl AstNode for Chart {
    fn node_type(&self) -> &'static str {
        "Chart"
    }

    fn display_label(&self) -> String {
        match self {
            Chart::Pending { .. } => "pending".to_string(),
            Chart::Live {
                rendering: Some(_), ..
            } => "live, mounted".to_string(),
            Chart::Live { rendering: None, .. } => "live".to_string(),
        }
    }
}
