//! Bridge configuration
//!
//! Every field has a default, so an empty TOML file (or none at all) yields
//! a working setup against a local broker.
//!
//! ```toml
//! broker_url = "nats://127.0.0.1:4222"
//! scenario_path = "scenarios.yaml"
//! receive_timeout_ms = 1000
//!
//! [channels]
//! player_input = "player.input"
//!
//! [backoff]
//! initial_ms = 100
//! max_ms = 5000
//! ```

use crate::error::ConfigError;
use crate::messages::PlaybackStatus;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default broker endpoint
pub const DEFAULT_BROKER_URL: &str = "nats://127.0.0.1:4222";

/// Top-level bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Broker endpoint
    pub broker_url: String,
    /// Scenario document location
    pub scenario_path: PathBuf,
    /// Channel names
    pub channels: ChannelConfig,
    /// How long one receive waits before timing out
    pub receive_timeout_ms: u64,
    /// Retry delays after transport failures
    pub backoff: BackoffConfig,
    /// Record returned by the placeholder playback reporter
    pub playback_status: PlaybackStatus,
}

impl BridgeConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Read` if the file cannot be read
    /// - `ConfigError::Parse` if it is not valid for this schema
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// With broker URL
    #[inline]
    #[must_use]
    pub fn with_broker_url(mut self, url: impl Into<String>) -> Self {
        self.broker_url = url.into();
        self
    }

    /// With scenario path
    #[inline]
    #[must_use]
    pub fn with_scenario_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scenario_path = path.into();
        self
    }

    /// With receive timeout
    #[inline]
    #[must_use]
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With backoff settings
    #[inline]
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Receive timeout as a duration
    #[inline]
    #[must_use]
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    /// Check values that would make the bridge misbehave
    ///
    /// # Errors
    /// `ConfigError::Invalid` describing the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.receive_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "receive_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.backoff.initial_ms == 0 {
            return Err(ConfigError::Invalid(
                "backoff.initial_ms must be greater than zero".into(),
            ));
        }
        if self.backoff.initial_ms > self.backoff.max_ms {
            return Err(ConfigError::Invalid(format!(
                "backoff.initial_ms ({}) exceeds backoff.max_ms ({})",
                self.backoff.initial_ms, self.backoff.max_ms
            )));
        }
        self.channels.validate()
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            broker_url: DEFAULT_BROKER_URL.to_string(),
            scenario_path: PathBuf::from("scenarios.yaml"),
            channels: ChannelConfig::default(),
            receive_timeout_ms: 1000,
            backoff: BackoffConfig::default(),
            playback_status: PlaybackStatus::default(),
        }
    }
}

/// Broker subjects used by the two loops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Inbound playback tasks
    pub player_input: String,
    /// Outbound playback status
    pub player_output: String,
    /// Inbound script changes
    pub ui_output: String,
    /// Outbound acknowledgements
    pub ui_input: String,
}

impl ChannelConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("player_input", &self.player_input),
            ("player_output", &self.player_output),
            ("ui_output", &self.ui_output),
            ("ui_input", &self.ui_input),
        ];
        if let Some((name, _)) = named.iter().find(|(_, subject)| subject.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("channels.{name} is empty")));
        }
        // a loop publishing to its own inbound subject would feed itself
        if self.player_input == self.player_output {
            return Err(ConfigError::Invalid(
                "channels.player_input and channels.player_output must differ".into(),
            ));
        }
        if self.ui_output == self.ui_input {
            return Err(ConfigError::Invalid(
                "channels.ui_output and channels.ui_input must differ".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            player_input: "player.input".to_string(),
            player_output: "player.output".to_string(),
            ui_output: "ui.output".to_string(),
            ui_input: "ui.input".to_string(),
        }
    }
}

/// Exponential retry delay bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay after the first failure
    pub initial_ms: u64,
    /// Upper bound on any delay
    pub max_ms: u64,
}

impl BackoffConfig {
    /// Initial delay as a duration
    #[inline]
    #[must_use]
    pub fn initial(&self) -> Duration {
        Duration::from_millis(self.initial_ms)
    }

    /// Maximum delay as a duration
    #[inline]
    #[must_use]
    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_ms: 100,
            max_ms: 5000,
        }
    }
}
