use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Command kinds understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Wake the engine; must precede any other interaction
    Wake,
    /// Write data (text) into the engine
    Write,
}

/// Ordered `key=value` parameters attached to an outbound message.
///
/// Rendered as `k1=v1,k2=v2`, which is the form the engine expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageParams {
    entries: Vec<(String, String)>,
}

impl MessageParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, replacing an earlier value for the same key
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for MessageParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        Ok(())
    }
}

/// A command sent to the engine. Built per send and not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub command: Command,
    pub arg1: i32,
    pub arg2: i32,
    pub params: MessageParams,
    pub data: Option<Vec<u8>>,
}

impl OutboundMessage {
    /// Wake signal, no parameters and no payload
    pub fn wake() -> Self {
        Self {
            command: Command::Wake,
            arg1: 0,
            arg2: 0,
            params: MessageParams::new(),
            data: None,
        }
    }

    /// Text write carrying the UTF-8 bytes of `text`
    pub fn write_text(params: MessageParams, text: &str) -> Self {
        Self {
            command: Command::Write,
            arg1: 0,
            arg2: 0,
            params,
            data: Some(text.as_bytes().to_vec()),
        }
    }

    /// Payload decoded back to text, if it is valid UTF-8
    pub fn text(&self) -> Option<&str> {
        self.data
            .as_deref()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }
}

/// Kind tag of an engine notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Engine state changed; `arg1` carries the state code
    State,
    /// Result payload; `info` is JSON, side channel holds content bytes
    Result,
    /// Engine error; `arg1` is the code, `info` the description
    Error,
    /// Any other notification the bridge does not react to
    Other(i32),
}

/// Engine session states reported through [`EventKind::State`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Ready,
    Working,
    Unknown(i32),
}

impl EngineState {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => EngineState::Idle,
            2 => EngineState::Ready,
            3 => EngineState::Working,
            other => EngineState::Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            EngineState::Idle => 1,
            EngineState::Ready => 2,
            EngineState::Working => 3,
            EngineState::Unknown(code) => code,
        }
    }
}

/// Byte blobs delivered alongside a result, keyed by content id
pub type SideChannel = HashMap<String, Vec<u8>>;

/// A notification pushed by the engine. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub kind: EventKind,
    pub arg1: i32,
    pub arg2: i32,
    pub info: String,
    pub data: SideChannel,
}

impl InboundEvent {
    pub fn state(state: EngineState) -> Self {
        Self {
            kind: EventKind::State,
            arg1: state.code(),
            arg2: 0,
            info: String::new(),
            data: SideChannel::new(),
        }
    }

    pub fn error(code: i32, description: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Error,
            arg1: code,
            arg2: 0,
            info: description.into(),
            data: SideChannel::new(),
        }
    }

    pub fn result(info: impl Into<String>, data: SideChannel) -> Self {
        Self {
            kind: EventKind::Result,
            arg1: 0,
            arg2: 0,
            info: info.into(),
            data,
        }
    }
}

/// A playable stream URL pulled out of a result event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub url: String,
}
