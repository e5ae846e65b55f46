pub mod activity_panel;
pub mod input_bar;
pub mod stage;

pub use activity_panel::ActivityPanel;
pub use input_bar::InputBar;
pub use stage::Stage;
