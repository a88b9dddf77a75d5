//! Tracking configuration.
//!
//! Configuration is read from TOML:
//!
//! ```toml
//! tick_interval_ms = 5000
//! initial_stage = "CONFIRMED"
//! ```
//!
//! Both keys are optional and fall back to [`TrackingConfig::default`].

use crate::tracking::domain::{OrderStage, TrackingDomainError};
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Interval between automatic stage advances when none is configured.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(5000);

/// Errors returned while loading tracking configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration '{path}': {source}")]
    Read {
        /// Path that was read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The configuration is not valid TOML or has unexpected keys.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// The tick interval is zero.
    #[error("tick interval must be greater than zero")]
    InvalidInterval,

    /// The initial stage does not name an order stage.
    #[error(transparent)]
    Stage(#[from] TrackingDomainError),
}

/// Settings applied to every tracking session.
///
/// # Examples
///
/// ```
/// use ordertrack::config::TrackingConfig;
/// use ordertrack::tracking::domain::OrderStage;
/// use std::time::Duration;
///
/// let config = TrackingConfig::default();
/// assert_eq!(config.tick_interval(), Duration::from_secs(5));
/// assert_eq!(config.initial_stage(), OrderStage::Confirmed);
///
/// let demo = TrackingConfig::demo();
/// assert_eq!(demo.tick_interval(), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingConfig {
    tick_interval: Duration,
    initial_stage: OrderStage,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            initial_stage: OrderStage::Confirmed,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTrackingConfig {
    tick_interval_ms: Option<u64>,
    initial_stage: Option<String>,
}

impl TrackingConfig {
    /// Creates a configuration with one-second ticks for demonstrations.
    #[must_use]
    pub const fn demo() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            initial_stage: OrderStage::Confirmed,
        }
    }

    /// Sets the tick interval.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInterval`] for a zero interval.
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Result<Self, ConfigError> {
        if tick_interval.is_zero() {
            return Err(ConfigError::InvalidInterval);
        }
        self.tick_interval = tick_interval;
        Ok(self)
    }

    /// Sets the stage new sessions start at.
    #[must_use]
    pub const fn with_initial_stage(mut self, initial_stage: OrderStage) -> Self {
        self.initial_stage = initial_stage;
        self
    }

    /// Returns the interval between automatic stage advances.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Returns the stage new sessions start at.
    #[must_use]
    pub const fn initial_stage(&self) -> OrderStage {
        self.initial_stage
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for malformed TOML, unknown keys, a zero
    /// interval, or an unknown stage tag.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let raw: RawTrackingConfig =
            toml::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))?;
        let mut config = Self::default();
        if let Some(millis) = raw.tick_interval_ms {
            config = config.with_tick_interval(Duration::from_millis(millis))?;
        }
        if let Some(stage) = raw.initial_stage {
            config = config.with_initial_stage(OrderStage::try_from(stage.as_str())?);
        }
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be opened, or any
    /// error of [`Self::from_toml_str`].
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let read_error = |source: std::io::Error| ConfigError::Read {
            path: path.to_string(),
            source: Arc::new(source),
        };
        let file_name = path
            .file_name()
            .ok_or_else(|| read_error(std::io::Error::other("path must include a file name")))?;
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let contents = dir.read_to_string(file_name).map_err(read_error)?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, TrackingConfig};
    use crate::tracking::domain::{OrderStage, TrackingDomainError};
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    fn empty_document_uses_defaults() -> Result<(), ConfigError> {
        let config = TrackingConfig::from_toml_str("")?;
        assert_eq!(config, TrackingConfig::default());
        Ok(())
    }

    #[rstest]
    #[case("initial_stage = \"PREPARING\"", OrderStage::Preparing)]
    #[case("initial_stage = \"out_for_delivery\"", OrderStage::OutForDelivery)]
    #[case("initial_stage = \"Delivered\"", OrderStage::Delivered)]
    fn initial_stage_accepts_any_case(
        #[case] source: &str,
        #[case] expected: OrderStage,
    ) -> Result<(), ConfigError> {
        let config = TrackingConfig::from_toml_str(source)?;
        assert_eq!(config.initial_stage(), expected);
        Ok(())
    }

    #[rstest]
    fn tick_interval_is_read_in_milliseconds() -> Result<(), ConfigError> {
        let config = TrackingConfig::from_toml_str("tick_interval_ms = 250")?;
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
        Ok(())
    }

    #[rstest]
    fn zero_interval_is_rejected() {
        let result = TrackingConfig::from_toml_str("tick_interval_ms = 0");
        assert!(matches!(result, Err(ConfigError::InvalidInterval)));
    }

    #[rstest]
    fn unknown_stage_is_rejected() {
        let result = TrackingConfig::from_toml_str("initial_stage = \"COOKING\"");
        assert!(matches!(
            result,
            Err(ConfigError::Stage(TrackingDomainError::InvalidStage(_)))
        ));
    }

    #[rstest]
    fn unknown_keys_are_rejected() {
        let result = TrackingConfig::from_toml_str("poll_interval_ms = 10");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[rstest]
    fn missing_file_reports_read_error() {
        let result = TrackingConfig::load(camino::Utf8Path::new("./does-not-exist/tracking.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
