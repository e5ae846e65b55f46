//! Application state for the desktop host
//!
//! Kept free of egui types so the command flow can be tested headless.

use crate::integration::{CommandChannel, MethodCall, MethodResponse};
use crate::messages::ActivityLog;

/// What happened to the last submitted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Forwarded to the engine
    Forwarded,
    /// Engine was not ready; initialization retried, text not sent
    Initializing,
    /// The command channel did not understand the call
    Unsupported,
}

pub struct AppState {
    /// Current text input
    pub input_text: String,

    pub activity: ActivityLog,

    pub last_send: Option<SendOutcome>,

    pub show_activity: bool,

    commands: CommandChannel,

    /// URL of the surface seen on the previous frame
    last_stream: Option<String>,
}

impl AppState {
    pub fn new(commands: CommandChannel) -> Self {
        Self {
            input_text: String::new(),
            activity: ActivityLog::new(),
            last_send: None,
            show_activity: true,
            commands,
            last_stream: None,
        }
    }

    /// Send the input text through the command channel.
    ///
    /// The input is cleared only when the text was forwarded, so a send
    /// that raced engine startup can simply be repeated.
    pub fn submit(&mut self) -> Option<SendOutcome> {
        let text = self.input_text.trim().to_string();
        if text.is_empty() {
            return None;
        }

        let outcome = match self.commands.handle(&MethodCall::start_speaking(&text)) {
            MethodResponse::Success(true) => {
                self.activity.add(format!("Sent: {}", text));
                self.input_text.clear();
                SendOutcome::Forwarded
            }
            MethodResponse::Success(false) => {
                match self.commands.last_error() {
                    Some(err) => self.activity.add(err.user_message()),
                    None => self.activity.add("Avatar service is starting, please send again"),
                }
                SendOutcome::Initializing
            }
            MethodResponse::NotImplemented => {
                self.activity.add("Command not supported");
                SendOutcome::Unsupported
            }
        };
        self.last_send = Some(outcome);
        Some(outcome)
    }

    /// Record changes of the playing stream in the activity log
    pub fn observe_stream(&mut self, current: Option<&str>) {
        if self.last_stream.as_deref() == current {
            return;
        }
        match current {
            Some(url) => self.activity.add(format!("Playing stream: {}", url)),
            None => self.activity.add("Stream stopped"),
        }
        self.last_stream = current.map(str::to_string);
    }
}
