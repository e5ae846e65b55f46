pub mod engine;
pub mod integration;
pub mod messages;
pub mod playback;
pub mod ui;
pub mod utils;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Config asset error: {0}")]
    AssetError(String),

    #[error("Engine error: {0}")]
    EngineError(String),

    #[error("Playback error: {0}")]
    PlaybackError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for BridgeError {
    fn from(e: std::io::Error) -> Self {
        BridgeError::IOError(e.to_string())
    }
}

impl BridgeError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Fixing these needs a new config file or asset
            BridgeError::ConfigError(_) => false,
            BridgeError::AssetError(_) => false,
            // The next command retries engine creation
            BridgeError::EngineError(_) => true,
            // The next stream URL replaces the surface
            BridgeError::PlaybackError(_) => true,
            BridgeError::ChannelError(_) => false,
            BridgeError::IOError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            BridgeError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            BridgeError::AssetError(_) => {
                "Engine configuration file could not be read.".to_string()
            }
            BridgeError::EngineError(_) => {
                "The avatar service is not connected yet. Please try again.".to_string()
            }
            BridgeError::PlaybackError(_) => {
                "The avatar video could not be started.".to_string()
            }
            BridgeError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            BridgeError::IOError(_) => "File system error occurred.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_split() {
        assert!(BridgeError::EngineError("create failed".into()).is_recoverable());
        assert!(BridgeError::PlaybackError("start failed".into()).is_recoverable());
        assert!(!BridgeError::ConfigError("bad toml".into()).is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.cfg");
        let err: BridgeError = io.into();
        assert!(matches!(err, BridgeError::IOError(ref msg) if msg.contains("missing.cfg")));
        assert_eq!(err.user_message(), "File system error occurred.");
    }
}
