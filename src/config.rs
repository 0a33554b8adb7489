//! Beacon configuration.
//!
//! Loaded from `~/.beacon/config.toml`. Every key is optional; a missing
//! file means all defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::orchestrator::Settings;

/// Beacon configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Base URL of the SOS service.
    pub backend_url: String,

    /// Seconds between status checks while an SOS is open.
    pub poll_interval_secs: u64,

    /// Upper bound, in seconds, on any single location, network, or dialer call.
    pub call_timeout_secs: u64,

    /// User id submitted when nobody is signed in.
    pub guest_id: String,

    /// The signed-in user, if any.
    pub user_id: Option<String>,

    /// Command that opens the dialer. `{number}` is replaced with the phone number.
    pub dialer: Vec<String>,

    /// Fixed position to report when `--lat`/`--lon` are not given.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            poll_interval_secs: 3,
            call_timeout_secs: 15,
            guest_id: "guest".to_string(),
            user_id: None,
            dialer: vec!["xdg-open".to_string(), "tel:{number}".to_string()],
            latitude: None,
            longitude: None,
        }
    }
}

impl Config {
    /// Load config from `~/.beacon/config.toml`, or defaults if there is none.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from a specific file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        if config.poll_interval_secs == 0 {
            return Err(format!(
                "poll-interval-secs must be at least 1 in {}",
                path.display()
            ));
        }
        if config.call_timeout_secs == 0 {
            return Err(format!(
                "call-timeout-secs must be at least 1 in {}",
                path.display()
            ));
        }

        Ok(config)
    }

    /// The config file path: `~/.beacon/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".beacon").join("config.toml"))
    }

    /// Orchestrator settings derived from this config.
    pub fn settings(&self) -> Settings {
        Settings {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            call_timeout: Duration::from_secs(self.call_timeout_secs),
            guest_id: self.guest_id.clone(),
        }
    }

    /// The configured fixed position, if both coordinates are set.
    pub fn fixed_position(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}
