//! Seam to the external conversational engine
//!
//! The engine is an opaque remote service. The bridge only ever talks to it
//! through [`EngineFactory`] and [`Engine`]; notifications come back through
//! the [`EventSink`] handed over at creation time.

pub mod asset;
pub mod loopback;

pub use crate::utils::channels::EventSink;
pub use asset::{strip_comments, ConfigAsset};
pub use loopback::{LoopbackEngine, LoopbackFactory};

use crate::messages::OutboundMessage;
use crate::Result;

/// Settings applied when an engine session is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Engine configuration text with comments already stripped
    pub config: String,

    /// Device serial number registered as engine system info (`sn`)
    pub device_id: String,
}

/// A live engine session
pub trait Engine: Send {
    /// Hand a message to the engine. Delivery is not acknowledged.
    fn send_message(&mut self, message: OutboundMessage) -> Result<()>;

    /// Release the session. Called exactly once by the owner.
    fn destroy(&mut self);
}

/// Creates engine sessions
pub trait EngineFactory: Send + Sync {
    fn create(&self, settings: &EngineSettings, events: EventSink) -> Result<Box<dyn Engine>>;
}
