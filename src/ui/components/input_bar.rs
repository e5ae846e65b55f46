//! Input bar component
//!
//! Text input and speak button wired to the command channel.

use crate::ui::state::{AppState, SendOutcome};
use crate::ui::theme::Theme;
use egui::{self, Key, RichText, Vec2};

pub struct InputBar<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> InputBar<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing_sm)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    self.show_text_input(ui);
                    ui.add_space(self.theme.spacing_sm);
                    self.show_speak_button(ui);
                });
                self.show_outcome(ui);
            });
    }

    fn show_text_input(&mut self, ui: &mut egui::Ui) {
        // leave room for the speak button
        let available_width = ui.available_width() - 60.0;

        let text_edit = egui::TextEdit::singleline(&mut self.state.input_text)
            .hint_text("Say something to the avatar...")
            .desired_width(available_width)
            .font(egui::TextStyle::Body)
            .margin(egui::Margin::symmetric(12.0, 8.0));

        let response = ui.add(text_edit);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Message input")
        });

        if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
            self.state.submit();
            response.request_focus();
        }
    }

    fn show_speak_button(&mut self, ui: &mut egui::Ui) {
        let can_send = !self.state.input_text.trim().is_empty();
        let fill = if can_send {
            self.theme.primary
        } else {
            self.theme.text_muted
        };

        let button = egui::Button::new(RichText::new("➤").size(18.0).color(egui::Color32::WHITE))
            .min_size(Vec2::splat(44.0))
            .rounding(self.theme.button_rounding)
            .fill(fill);

        let response = ui.add_enabled(can_send, button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, can_send, "Speak")
        });
        if response.clicked() {
            self.state.submit();
        }
        response.on_hover_text("Speak (Enter)");
    }

    fn show_outcome(&self, ui: &mut egui::Ui) {
        let Some(outcome) = self.state.last_send else {
            return;
        };
        let (text, color) = match outcome {
            SendOutcome::Forwarded => ("Sent to avatar", self.theme.success),
            SendOutcome::Initializing => (
                "Avatar service is starting, send again in a moment",
                self.theme.warning,
            ),
            SendOutcome::Unsupported => ("Command not supported", self.theme.error),
        };
        ui.label(RichText::new(text).size(12.0).color(color));
    }
}
