pub mod app;
pub mod components;
pub mod state;
pub mod theme;

pub use app::AvatarApp;
pub use state::{AppState, SendOutcome};
pub use theme::Theme;
