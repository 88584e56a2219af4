//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the correction
//! endpoint, the hotkey and the synthetic-input timings, `AppPaths` for the
//! platform config directory, and TOML persistence via `AppConfig::load` /
//! `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, Endpoint, HotkeyConfig, InjectConfig, LlmConfig, ResponseMode};
