//! Configuration for the integration layer
//!
//! Loaded from a TOML file; every section falls back to its defaults.

use crate::engine::loopback::DEFAULT_NOT_AWAKE_CODE;
use crate::engine::ConfigAsset;
use crate::messages::payload::{DEFAULT_STREAM_EVENT_TYPE, DEFAULT_STREAM_SUB_CHANNEL};
use crate::messages::{MessageParams, StreamDecoder};
use crate::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Engine session settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine configuration asset; an empty JSON object when unset
    pub config_path: Option<PathBuf>,

    /// Device serial number registered before the engine is created
    pub device_id: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            device_id: "avatar_test_device_001".to_string(),
        }
    }
}

/// Routing parameters attached to every text write
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Subscriber (service) the text is addressed to
    pub sub: String,

    /// Session / user identifier
    pub auth_id: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            sub: "nlp".to_string(),
            auth_id: "avatar_user_001".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreetingConfig {
    /// Sent once each time the engine reports it is working
    pub text: String,

    /// Delay between the working notification and the greeting
    pub delay_ms: u64,
}

impl Default for GreetingConfig {
    fn default() -> Self {
        Self {
            text: "Hello, I'm your interviewer. Are you ready?".to_string(),
            delay_ms: 1000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Engine error code meaning "wake did not take"; answered with another wake
    pub not_awake_code: i32,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            not_awake_code: DEFAULT_NOT_AWAKE_CODE,
        }
    }
}

/// Markers identifying stream notifications in result payloads
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub sub_channel: String,
    pub event_type: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sub_channel: DEFAULT_STREAM_SUB_CHANNEL.to_string(),
            event_type: DEFAULT_STREAM_EVENT_TYPE.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopbackConfig {
    /// URL the loopback engine announces for every text
    pub stream_url: String,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            stream_url: "rtmp://127.0.0.1/live/avatar".to_string(),
        }
    }
}

/// Configuration for the complete bridge
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub engine: EngineConfig,
    pub routing: RoutingConfig,
    pub greeting: GreetingConfig,
    pub recovery: RecoveryConfig,
    pub stream: StreamConfig,
    pub loopback: LoopbackConfig,
}

impl BridgeConfig {
    /// Default location: `<config dir>/avatar-bridge/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("avatar-bridge").join("config.toml"))
    }

    /// Load and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: BridgeConfig = toml::from_str(&content).map_err(|e| {
            BridgeError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise the default location if it exists,
    /// otherwise the built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => {
                info!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Set the device serial number
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.engine.device_id = device_id.into();
        self
    }

    /// Set the engine configuration asset path
    pub fn with_engine_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.engine.config_path = Some(path.into());
        self
    }

    /// Set the greeting text and delay
    pub fn with_greeting(mut self, text: impl Into<String>, delay: Duration) -> Self {
        self.greeting.text = text.into();
        self.greeting.delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_not_awake_code(mut self, code: i32) -> Self {
        self.recovery.not_awake_code = code;
        self
    }

    pub fn with_loopback_stream(mut self, url: impl Into<String>) -> Self {
        self.loopback.stream_url = url.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.engine.device_id.trim().is_empty() {
            return Err(BridgeError::ConfigError(
                "engine.device_id must not be empty".to_string(),
            ));
        }
        if self.routing.sub.trim().is_empty() {
            return Err(BridgeError::ConfigError(
                "routing.sub must not be empty".to_string(),
            ));
        }
        // params are rendered as k=v,k=v so these would corrupt the list
        for (name, value) in [
            ("routing.sub", &self.routing.sub),
            ("routing.auth_id", &self.routing.auth_id),
        ] {
            if value.contains(',') || value.contains('=') {
                return Err(BridgeError::ConfigError(format!(
                    "{} must not contain ',' or '=': {}",
                    name, value
                )));
            }
        }
        if self.stream.sub_channel.is_empty() || self.stream.event_type.is_empty() {
            return Err(BridgeError::ConfigError(
                "stream.sub_channel and stream.event_type must be set".to_string(),
            ));
        }
        Ok(())
    }

    /// Where the engine configuration text is read from
    pub fn config_asset(&self) -> ConfigAsset {
        match &self.engine.config_path {
            Some(path) => ConfigAsset::File(path.clone()),
            None => ConfigAsset::default(),
        }
    }

    /// Parameters for text writes: `sub=..,auth_id=..,data_type=text`
    pub fn write_params(&self) -> MessageParams {
        MessageParams::new()
            .with("sub", &self.routing.sub)
            .with("auth_id", &self.routing.auth_id)
            .with("data_type", "text")
    }

    pub fn greeting_delay(&self) -> Duration {
        Duration::from_millis(self.greeting.delay_ms)
    }

    pub fn stream_decoder(&self) -> StreamDecoder {
        StreamDecoder::new(&self.stream.sub_channel, &self.stream.event_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.recovery.not_awake_code, 21022);
        assert_eq!(config.greeting_delay(), Duration::from_millis(1000));
        assert_eq!(
            config.write_params().to_string(),
            "sub=nlp,auth_id=avatar_user_001,data_type=text"
        );
        assert_eq!(config.config_asset(), ConfigAsset::Inline("{}".to_string()));
    }

    #[test]
    fn test_config_builder() {
        let config = BridgeConfig::default()
            .with_device_id("kiosk_7")
            .with_engine_config("/etc/avatar/engine.cfg")
            .with_greeting("hi", Duration::from_millis(250))
            .with_not_awake_code(4242);

        assert_eq!(config.engine.device_id, "kiosk_7");
        assert_eq!(
            config.config_asset(),
            ConfigAsset::File(PathBuf::from("/etc/avatar/engine.cfg"))
        );
        assert_eq!(config.greeting.text, "hi");
        assert_eq!(config.greeting_delay(), Duration::from_millis(250));
        assert_eq!(config.recovery.not_awake_code, 4242);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: BridgeConfig = toml::from_str(
            r#"
            [routing]
            auth_id = "candidate_42"

            [greeting]
            delay_ms = 1500
            "#,
        )
        .unwrap();

        assert_eq!(config.routing.sub, "nlp");
        assert_eq!(config.routing.auth_id, "candidate_42");
        assert_eq!(config.greeting.delay_ms, 1500);
        assert_eq!(config.stream.sub_channel, "cbm_vms");
    }

    #[test]
    fn test_validation_rejects_separators() {
        let mut config = BridgeConfig::default();
        config.routing.auth_id = "a,b".to_string();
        assert!(config.validate().is_err());

        let config = BridgeConfig::default().with_device_id("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path =
            std::env::temp_dir().join(format!("avatar_bridge_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[engine]\ndevice_id = \"booth_3\"\n").unwrap();

        let loaded = BridgeConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.unwrap().engine.device_id, "booth_3");
    }

    #[test]
    fn test_load_missing_file() {
        let err = BridgeConfig::load("/nonexistent/avatar-bridge.toml").unwrap_err();
        assert!(matches!(err, BridgeError::ConfigError(_)));
    }
}
