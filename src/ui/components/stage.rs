//! Stage component: hosts the playback surface, filling the central area

use crate::playback::SurfaceInfo;
use crate::ui::theme::Theme;
use egui::{self, Align2, FontId, Sense};

pub struct Stage<'a> {
    surface: Option<&'a SurfaceInfo>,
    theme: &'a Theme,
}

impl<'a> Stage<'a> {
    pub fn new(surface: Option<&'a SurfaceInfo>, theme: &'a Theme) -> Self {
        Self { surface, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, self.theme.bg_stage);

        let (headline, detail, color) = match self.surface {
            Some(surface) if surface.playing => (
                "▶ Live",
                surface.source.clone().unwrap_or_default(),
                self.theme.success,
            ),
            Some(surface) => (
                "Stream could not start",
                surface.source.clone().unwrap_or_default(),
                self.theme.error,
            ),
            None => (
                "Waiting for avatar stream",
                String::new(),
                self.theme.text_muted,
            ),
        };

        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Other, true, headline)
        });

        painter.text(
            rect.center(),
            Align2::CENTER_BOTTOM,
            headline,
            FontId::proportional(28.0),
            color,
        );
        if !detail.is_empty() {
            painter.text(
                rect.center() + egui::vec2(0.0, self.theme.spacing_sm),
                Align2::CENTER_TOP,
                detail,
                FontId::monospace(14.0),
                self.theme.text_muted,
            );
        }
    }
}
