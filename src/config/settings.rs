//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`.
//! Every section is `#[serde(default)]` so a hand-edited `settings.toml` only
//! needs the keys it wants to override.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::hotkey::HotkeySpec;

// ---------------------------------------------------------------------------
// Endpoint / ResponseMode
// ---------------------------------------------------------------------------

/// Which Ollama completion route the correction client talks to.
///
/// | Variant    | Route           | Corrected text field |
/// |------------|-----------------|----------------------|
/// | `Chat`     | `/api/chat`     | `message.content`    |
/// | `Generate` | `/api/generate` | `response`           |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endpoint {
    Chat,
    Generate,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::Chat
    }
}

impl Endpoint {
    /// Path appended to [`LlmConfig::base_url`].
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Chat => "/api/chat",
            Endpoint::Generate => "/api/generate",
        }
    }
}

/// Shape of the response body.
///
/// The shape is chosen here and sent to the server as the `stream` flag; the
/// client never guesses it from the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseMode {
    /// `stream: false`: one JSON object.
    Single,
    /// `stream: true`: newline-delimited JSON chunks, read to completion.
    Lines,
}

impl Default for ResponseMode {
    fn default() -> Self {
        Self::Single
    }
}

impl ResponseMode {
    /// Value of the `stream` field in the request body.
    pub fn stream_flag(self) -> bool {
        matches!(self, ResponseMode::Lines)
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the correction endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the local inference server (Ollama default
    /// `http://127.0.0.1:11434`).
    pub base_url: String,
    /// Model identifier sent with every request (e.g. `"mistral"`).
    pub model: String,
    /// Completion route.
    pub endpoint: Endpoint,
    /// Response body shape.
    pub response_mode: ResponseMode,
    /// Upper bound on a whole correction call, connection included.
    pub timeout_secs: u64,
    /// Upper bound on establishing the TCP connection.
    pub connect_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".into(),
            model: "mistral".into(),
            endpoint: Endpoint::default(),
            response_mode: ResponseMode::default(),
            timeout_secs: 30,
            connect_timeout_secs: 3,
        }
    }
}

impl LlmConfig {
    /// Full URL of the configured completion route.
    ///
    /// A trailing `/` on `base_url` is tolerated.
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.endpoint.path())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// HotkeyConfig
// ---------------------------------------------------------------------------

/// Global hotkey binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Key combination that triggers a correction (e.g. `"Alt+S"`).
    pub trigger: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            trigger: "Alt+S".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// InjectConfig
// ---------------------------------------------------------------------------

/// Delays around the synthetic key gestures.
///
/// Target applications process key events and clipboard requests
/// asynchronously, so the workflow pauses at the points where it depends on
/// them having caught up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectConfig {
    /// Wait after the hotkey fires so the user can lift the trigger keys.
    pub start_delay_ms: u64,
    /// Wait after the copy gesture before reading the clipboard.
    pub copy_settle_ms: u64,
    /// Wait after the paste gesture before restoring the clipboard.
    pub paste_settle_ms: u64,
}

impl Default for InjectConfig {
    fn default() -> Self {
        Self {
            start_delay_ms: 200,
            copy_settle_ms: 100,
            paste_settle_ms: 200,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use line_corrector::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Correction endpoint settings.
    pub llm: LlmConfig,
    /// Global hotkey binding.
    pub hotkey: HotkeyConfig,
    /// Synthetic input timings.
    pub inject: InjectConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns `true` when no `settings.toml` file exists yet.
    pub fn is_first_run() -> bool {
        !AppPaths::new().settings_file.exists()
    }

    /// Reject settings the host cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.llm.base_url.trim().is_empty() {
            bail!("llm.base_url must not be empty");
        }
        if self.llm.model.trim().is_empty() {
            bail!("llm.model must not be empty");
        }
        if self.llm.timeout_secs == 0 {
            bail!("llm.timeout_secs must be at least 1");
        }
        HotkeySpec::parse(&self.hotkey.trigger)
            .with_context(|| format!("invalid hotkey.trigger {:?}", self.hotkey.trigger))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
