//! Main application struct and eframe integration
//!
//! `AvatarApp` is the UI thread: it drains the UI queue every frame, so
//! the playback sink is only ever touched here.

use crate::integration::Orchestrator;
use crate::playback::{PanelSurfaces, PlaybackSink, Viewport};
use crate::ui::components::{ActivityPanel, InputBar, Stage};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use crate::utils::UiLooper;
use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};
use std::time::{Duration, Instant};
use tracing::info;

/// Frame interval while idle, bounds the latency of queued UI work
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct AvatarApp {
    orchestrator: Orchestrator,
    looper: UiLooper,
    sink: PlaybackSink,
    surfaces: PanelSurfaces,
    state: AppState,
    theme: Theme,
}

impl AvatarApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        orchestrator: Orchestrator,
        looper: UiLooper,
    ) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        let surfaces = PanelSurfaces::new();
        let sink = PlaybackSink::new(Box::new(surfaces.clone()));
        let state = AppState::new(orchestrator.command_channel());
        state.activity.add("Avatar bridge started");

        Self {
            orchestrator,
            looper,
            sink,
            surfaces,
            state,
            theme,
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Avatar Bridge")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .button("📋")
                            .on_hover_text("Toggle Activity Panel")
                            .clicked()
                        {
                            self.state.show_activity = !self.state.show_activity;
                        }

                        if ui.button("🗑").on_hover_text("Clear Activity").clicked() {
                            self.state.activity.clear();
                        }
                    });
                });
            });
    }

    fn show_input_area(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("input_area")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                InputBar::new(&mut self.state, &self.theme).show(ui);
            });
    }

    fn show_activity_panel(&mut self, ctx: &egui::Context) {
        if !self.state.show_activity {
            return;
        }

        let engine_ready = self.orchestrator.bridge().is_initialized();
        let pending = self.looper.pending();
        SidePanel::right("activity_panel")
            .resizable(true)
            .default_width(300.0)
            .min_width(220.0)
            .max_width(480.0)
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                ActivityPanel::new(&self.state.activity, engine_ready, pending, &self.theme)
                    .show(ui);
            });
    }

    fn show_stage(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_stage))
            .show(ctx, |ui| {
                let size = ui.available_size();
                self.sink.set_viewport(Viewport::new(size.x, size.y));

                let active = self.surfaces.active();
                Stage::new(active.as_ref(), &self.theme).show(ui);
            });
    }
}

impl eframe::App for AvatarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // stream playback and greetings posted by the listener run here
        self.looper.run_due(Instant::now(), &mut self.sink);
        self.state.observe_stream(self.sink.current_url());

        self.show_header(ctx);
        self.show_activity_panel(ctx);
        self.show_input_area(ctx);
        self.show_stage(ctx);

        let wait = match self.looper.next_deadline() {
            Some(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .min(POLL_INTERVAL),
            None => POLL_INTERVAL,
        };
        ctx.request_repaint_after(wait);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Avatar bridge shutting down");
        self.sink.teardown();
        self.orchestrator.shutdown();
    }
}
