//! Activity panel component
//!
//! Shows engine status and recent bridge activity.

use crate::messages::ActivityLog;
use crate::ui::theme::Theme;
use egui::{self, RichText, ScrollArea};

pub struct ActivityPanel<'a> {
    activity: &'a ActivityLog,
    engine_ready: bool,
    pending_tasks: usize,
    theme: &'a Theme,
}

impl<'a> ActivityPanel<'a> {
    pub fn new(
        activity: &'a ActivityLog,
        engine_ready: bool,
        pending_tasks: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            activity,
            engine_ready,
            pending_tasks,
            theme,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new("Activity")
                .strong()
                .color(self.theme.text_primary),
        );
        ui.separator();

        egui::Grid::new("bridge_status")
            .num_columns(2)
            .spacing([20.0, 4.0])
            .show(ui, |ui| {
                let (engine, color) = if self.engine_ready {
                    ("connected", self.theme.success)
                } else {
                    ("not connected", self.theme.warning)
                };
                ui.label(RichText::new("Engine").color(self.theme.text_muted));
                ui.label(RichText::new(engine).color(color));
                ui.end_row();

                ui.label(RichText::new("Scheduled").color(self.theme.text_muted));
                ui.label(self.pending_tasks.to_string());
                ui.end_row();
            });

        ui.add_space(self.theme.spacing_sm);

        ScrollArea::vertical()
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for entry in self.activity.get_all() {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(
                            RichText::new(entry.at.format("%H:%M:%S").to_string())
                                .size(11.0)
                                .family(egui::FontFamily::Monospace)
                                .color(self.theme.text_muted),
                        );
                        ui.label(RichText::new(entry.text).size(12.0));
                    });
                }
            });
    }
}
