pub mod channels;

pub use channels::{event_channel, EventSink, UiLooper, UiQueue, UiTask};
