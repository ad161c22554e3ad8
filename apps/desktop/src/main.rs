use anyhow::Context;
use evidence_core::StationConfig;
use iced::{Application, Settings, Size};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod ui;

use app::StationApp;

fn main() -> anyhow::Result<()> {
    // Initialize tracing, RUST_LOG wins over the default filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,evidence=debug")),
        )
        .init();

    info!("Starting Evidence Station v{}", env!("CARGO_PKG_VERSION"));

    let config = StationConfig::load().context("loading station configuration")?;

    StationApp::run(Settings {
        window: iced::window::Settings {
            size: Size::new(1280.0, 860.0),
            min_size: Some(Size::new(900.0, 600.0)),
            position: iced::window::Position::Centered,
            ..Default::default()
        },
        ..Settings::with_flags(config)
    })?;

    Ok(())
}
