use std::{env, fs, path::Path, sync::Mutex};

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use muzigim::{
    app::App,
    config::{Settings, log_path, settings_path},
};

// The terminal is in raw mode while running, so logs go to a file.
fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "muzigim=info".into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging(&log_path())?;

    let settings_path = settings_path();
    let mut settings = Settings::load_or_default(&settings_path);
    if let Some(base) = env::args().nth(1) {
        settings.asset_base = base;
    }
    info!("Starting muzigim {}", env!("CARGO_PKG_VERSION"));

    let mut terminal = ratatui::init();
    let mut app = App::new(settings, settings_path);
    let result = app.run(&mut terminal);
    ratatui::restore();
    result.context("terminal error")
}
