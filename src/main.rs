//! Application entry point: hotkey line corrector.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (writes the defaults on first run).
//! 3. Parse the trigger chord and spawn the hotkey listener thread.
//! 4. Create the [`tokio`] runtime.
//! 5. Build the [`Workflow`] from the real keyboard, clipboard and Ollama
//!    client.
//! 6. Run the orchestrator on the main thread until the listener goes away.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

use line_corrector::{
    config::{AppConfig, AppPaths},
    hotkey::{HotkeyEvent, HotkeyListener, HotkeySpec},
    inject::{ArboardClipboard, EnigoInjector},
    llm::OllamaCorrector,
    workflow::{Workflow, WorkflowOptions},
};

fn load_config() -> AppConfig {
    let first_run = AppConfig::is_first_run();
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e:#}); using defaults");
        AppConfig::default()
    });

    if first_run {
        match config.save() {
            Ok(()) => log::info!(
                "Wrote default settings to {}",
                AppPaths::new().settings_file.display()
            ),
            Err(e) => log::warn!("Could not write default settings: {e:#}"),
        }
    }

    config
}

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Line corrector starting up");

    // 2. Configuration
    let config = load_config();
    config.validate().context("invalid settings")?;
    log::info!(
        "Correction endpoint: {} (model={}, mode={:?})",
        config.llm.url(),
        config.llm.model,
        config.llm.response_mode
    );

    // 3. Hotkey listener thread
    let spec = HotkeySpec::parse(&config.hotkey.trigger)?;
    let (hotkey_tx, hotkey_rx) = mpsc::channel::<HotkeyEvent>(4);
    let _hotkey_listener =
        HotkeyListener::start(spec, hotkey_tx).context("spawning hotkey listener thread")?;
    log::info!("Press {spec} to correct the text before the caret");

    // 4. Tokio runtime
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("creating tokio runtime")?;

    // 5. Orchestrator
    let workflow = Workflow::new(
        Arc::new(EnigoInjector::new()),
        Arc::new(ArboardClipboard::new()),
        Arc::new(OllamaCorrector::from_config(&config.llm)),
        WorkflowOptions::from_config(&config),
    );

    // 6. Blocks until the hotkey channel closes
    rt.block_on(workflow.run(hotkey_rx));

    Ok(())
}
