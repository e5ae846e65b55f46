pub mod bridge;
pub mod command;
pub mod config;
pub mod listener;
pub mod orchestrator;

pub use bridge::SessionBridge;
pub use command::{CommandChannel, MethodCall, MethodResponse, START_SPEAKING};
pub use config::BridgeConfig;
pub use listener::{EventListener, ListenerHandle};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
