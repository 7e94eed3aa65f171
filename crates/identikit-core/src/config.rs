//! Studio configuration: backend origin and generation strategy.
//!
//! Load precedence: env `IDENTIKIT_CONFIG` path > `config/studio.toml` >
//! defaults, with `IDENTIKIT_*` environment overrides on top.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the engine drives a long generation against the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Probe the async start endpoint on the first attempt and remember the
    /// answer; backends without it get the simulated-progress path.
    #[default]
    Auto,
    /// Always use task polling. Start-call failures are surfaced, not
    /// papered over with the fallback.
    Poll,
    /// Always use the blocking call with simulated progress.
    Sync,
}

/// Global client configuration. Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Backend origin, e.g. `http://localhost:8000`.
    pub backend_url: String,
    /// Per-request ceiling for the HTTP client. The blocking generate call
    /// can take minutes, so this is generous.
    pub request_timeout_secs: u64,
    /// IDENTIKIT_GENERATION_MODE: "auto" | "poll" | "sync".
    #[serde(default)]
    pub generation_mode: GenerationMode,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 600,
            generation_mode: GenerationMode::Auto,
        }
    }
}

impl StudioConfig {
    /// Load config from file and environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("IDENTIKIT_CONFIG").unwrap_or_else(|_| "config/studio".to_string());
        let builder = config::Config::builder()
            .set_default("backend_url", "http://localhost:8000")?
            .set_default("request_timeout_secs", 600_i64)?
            .set_default("generation_mode", "auto")?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        builder
            .add_source(config::Environment::with_prefix("IDENTIKIT").separator("__"))
            .build()?
            .try_deserialize()
    }
}
