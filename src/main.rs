use anyhow::Context;
use furnish::{AppConfig, FurnishApp};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .init();

    log::info!(
        "Starting {} with models from {}",
        config.window.title,
        config.assets.model_dir.display()
    );

    FurnishApp::new(config)?.run()
}
