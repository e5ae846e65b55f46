pub mod payload;
pub mod storage;
pub mod types;

pub use payload::StreamDecoder;
pub use storage::{ActivityEntry, ActivityLog};
pub use types::{
    Command, EngineState, EventKind, InboundEvent, MessageParams, OutboundMessage, SideChannel,
    StreamDescriptor,
};
