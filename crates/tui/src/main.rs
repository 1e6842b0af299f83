mod app;
mod prompt;
mod startup;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    process::ExitCode,
    sync::Mutex,
};

use simshell_core::{
    bootstrap,
    config::{self, AppConfig},
    Controller, SaveStore, Session, MENU,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::prompt::ConsolePrompt;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config)?;

    let catalog = match startup::load_catalog(&config.data_path) {
        Ok(catalog) => catalog,
        Err(status) => return Ok(ExitCode::from(status)),
    };

    let store = SaveStore::new(&config.save_path);
    let mut prompt = ConsolePrompt::default();
    let document = bootstrap::run(&mut prompt, &store)?;
    println!("Setup complete. Launching UI...");
    info!(version = document.version, "Session ready");

    let controller = Controller::new(&MENU, Session::new(store, document));
    let mut app = app::SimShellApp::new(config, catalog, controller);
    if prompt.has_warning() {
        app.notify(prompt.notices().join("\n"));
    }
    let outcome = app.run().await?;
    Ok(ExitCode::from(startup::exit_status(outcome)))
}

fn init_logging(config: &AppConfig) -> Result<()> {
    fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("failed to create {}", config.log_dir.display()))?;
    let log_path = config.log_dir.join("simshell.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // Only the file layer: stdout belongs to the alternate screen once the UI starts.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
