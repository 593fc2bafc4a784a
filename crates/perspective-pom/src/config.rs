//! Resolution timing configuration.
//!
//! [`PieceConfig`] is the serializable form (YAML file, environment).
//! [`PieceSettings`] is the runtime form every page object is built from: a
//! shared driver handle plus timing, description and diagnostics.

use crate::diagnostics::DiagnosticSink;
use crate::driver::Driver;
use crate::result::{PomError, PomResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable overriding the timeout, in seconds
pub const ENV_TIMEOUT: &str = "POM_TIMEOUT_SECS";
/// Environment variable overriding the poll interval, in seconds
pub const ENV_POLL_FREQ: &str = "POM_POLL_FREQ_SECS";
/// Environment variable setting the diagnostic description
pub const ENV_DESCRIPTION: &str = "POM_DESCRIPTION";

/// Timing configuration in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieceConfig {
    /// Seconds to poll before giving up on a lookup
    pub timeout_secs: f64,
    /// Seconds between polls
    pub poll_freq_secs: f64,
    /// Label attached to failures
    pub description: Option<String>,
}

impl Default for PieceConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs_f64(),
            poll_freq_secs: DEFAULT_POLL_INTERVAL.as_secs_f64(),
            description: None,
        }
    }
}

impl PieceConfig {
    /// Parse from YAML
    pub fn from_yaml_str(yaml: &str) -> PomResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_file(path: &Path) -> PomResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Defaults overridden by `POM_*` environment variables
    pub fn from_env() -> PomResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> PomResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_TIMEOUT) {
            config.timeout_secs = parse_secs(ENV_TIMEOUT, &raw)?;
        }

        if let Some(raw) = lookup(ENV_POLL_FREQ) {
            config.poll_freq_secs = parse_secs(ENV_POLL_FREQ, &raw)?;
        }

        if let Some(description) = lookup(ENV_DESCRIPTION) {
            config.description = Some(description);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject negative, non-finite or unrepresentable durations
    pub fn validate(&self) -> PomResult<()> {
        for (name, value) in [
            ("timeout_secs", self.timeout_secs),
            ("poll_freq_secs", self.poll_freq_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PomError::Config {
                    message: format!("{name} must be a finite, non-negative number, got {value}"),
                });
            }
            Duration::try_from_secs_f64(value).map_err(|e| PomError::Config {
                message: format!("{name} is out of range ({value}): {e}"),
            })?;
        }
        Ok(())
    }

    /// Timeout as a Duration, saturating for values `validate` rejects
    #[must_use]
    pub fn timeout(&self) -> Duration {
        secs_to_duration(self.timeout_secs)
    }

    /// Poll interval as a Duration, saturating for values `validate` rejects
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        secs_to_duration(self.poll_freq_secs)
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

fn parse_secs(key: &str, raw: &str) -> PomResult<f64> {
    raw.trim().parse().map_err(|_| PomError::Config {
        message: format!("Invalid {key}: {raw:?}"),
    })
}

// =============================================================================
// RUNTIME SETTINGS
// =============================================================================

/// Everything a page object needs besides its locator
#[derive(Debug, Clone)]
pub struct PieceSettings {
    driver: Arc<dyn Driver>,
    timeout: Duration,
    poll_interval: Duration,
    description: Option<String>,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl PieceSettings {
    /// Default timing over `driver`
    #[must_use]
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            description: None,
            sink: None,
        }
    }

    /// Settings from a validated config
    pub fn from_config(driver: Arc<dyn Driver>, config: &PieceConfig) -> PomResult<Self> {
        config.validate()?;
        Ok(Self {
            driver,
            timeout: config.timeout(),
            poll_interval: config.poll_interval(),
            description: config.description.clone(),
            sink: None,
        })
    }

    /// Set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set polling interval
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set the diagnostic description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Clear the diagnostic description
    #[must_use]
    pub fn without_description(mut self) -> Self {
        self.description = None;
        self
    }

    /// Send interception screenshots to `sink`
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Shared driver handle
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    /// Default timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Poll interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Diagnostic description
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Screenshot sink, if any
    #[must_use]
    pub fn sink(&self) -> Option<&Arc<dyn DiagnosticSink>> {
        self.sink.as_ref()
    }

    /// Poll options, with `timeout` overriding the default when given
    #[must_use]
    pub fn wait_options(&self, timeout: Option<Duration>) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timeout.unwrap_or(self.timeout))
            .with_poll_interval(self.poll_interval)
    }
}
