use anyhow::{anyhow, Context, Result};
use avatar_bridge::integration::{BridgeConfig, OrchestratorBuilder};
use avatar_bridge::ui::AvatarApp;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "avatar_bridge=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting avatar bridge");

    // optional config path as the first argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = BridgeConfig::load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;

    let (orchestrator, looper) = OrchestratorBuilder::new()
        .with_config(config)
        .start()
        .context("Failed to start the bridge")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Avatar Bridge"),
        ..Default::default()
    };

    eframe::run_native(
        "Avatar Bridge",
        options,
        Box::new(move |cc| Ok(Box::new(AvatarApp::new(cc, orchestrator, looper)))),
    )
    .map_err(|e| anyhow!("UI terminated with an error: {}", e))
}
