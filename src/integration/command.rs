//! Command channel between the UI layer and the session bridge

use crate::integration::bridge::SessionBridge;
use crate::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Method name for "speak this text"
pub const START_SPEAKING: &str = "startSpeaking";

/// A named call with loose arguments, e.g.
/// `{ "method": "startSpeaking", "text": "hello" }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(flatten)]
    pub arguments: Map<String, Value>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Map::new(),
        }
    }

    pub fn start_speaking(text: impl Into<String>) -> Self {
        Self::new(START_SPEAKING).with_argument("text", Value::String(text.into()))
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(key.into(), value);
        self
    }

    /// String argument; absent or non-string values read as `None`
    pub fn argument_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }

    /// Decode a call from its JSON form
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| BridgeError::ChannelError(format!("Malformed method call: {}", e)))
    }
}

/// Answer to a method call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum MethodResponse {
    /// `true` when forwarded, `false` when the bridge was (re)initializing
    Success(bool),
    NotImplemented,
}

/// Routes UI method calls to the session bridge
#[derive(Clone)]
pub struct CommandChannel {
    bridge: Arc<SessionBridge>,
}

impl CommandChannel {
    pub fn new(bridge: Arc<SessionBridge>) -> Self {
        Self { bridge }
    }

    pub fn handle(&self, call: &MethodCall) -> MethodResponse {
        match call.method.as_str() {
            START_SPEAKING => {
                // a missing text still goes out, as an empty write
                let text = call.argument_str("text").unwrap_or_default();
                debug!("startSpeaking: {} chars", text.chars().count());
                MethodResponse::Success(self.bridge.send(text))
            }
            other => {
                warn!("Method not implemented: {}", other);
                MethodResponse::NotImplemented
            }
        }
    }

    /// Why the engine is not available, if its last initialization failed
    pub fn last_error(&self) -> Option<BridgeError> {
        self.bridge.last_error()
    }

    /// Convenience for the `startSpeaking` call
    pub fn start_speaking(&self, text: &str) -> bool {
        matches!(
            self.handle(&MethodCall::start_speaking(text)),
            MethodResponse::Success(true)
        )
    }
}
