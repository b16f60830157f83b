//! Environment-based configuration.

use std::time::Duration;

use super::{ExpectConfig, LineEnding};
use crate::error::{ExpectError, Result};

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "STREAM_EXPECT";

/// Recognized variable names (without prefix).
pub mod vars {
    /// Buffer capacity in bytes.
    pub const CAPACITY: &str = "CAPACITY";
    /// Expect deadline in milliseconds.
    pub const TIMEOUT_MS: &str = "TIMEOUT_MS";
    /// Line ending for `send_line` (`lf`, `crlf`, `cr`).
    pub const LINE_ENDING: &str = "LINE_ENDING";
}

/// Environment variable reader.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Prefix for environment variables.
    prefix: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvConfig {
    /// Create a new environment config reader.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Build the full environment variable name.
    #[must_use]
    pub fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        std::env::var(self.var_name(name)).ok()
    }

    /// Get a parsed value.
    ///
    /// A set but unparsable variable is an error rather than silently
    /// falling back to the default.
    pub fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(name)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|e| {
                    ExpectError::config(format!("{}={raw:?}: {e}", self.var_name(name)))
                })
            })
            .transpose()
    }

    /// Get a duration in milliseconds.
    pub fn duration_millis(&self, name: &str) -> Result<Option<Duration>> {
        Ok(self.parse::<u64>(name)?.map(Duration::from_millis))
    }
}

/// Load an [`ExpectConfig`] from the variables visible through `env`.
pub fn load(env: &EnvConfig) -> Result<ExpectConfig> {
    let mut config = ExpectConfig::default();

    if let Some(capacity) = env.parse::<usize>(vars::CAPACITY)? {
        config.capacity = capacity;
    }
    if let Some(timeout) = env.duration_millis(vars::TIMEOUT_MS)? {
        config.timeout = timeout;
    }
    if let Some(line_ending) = env.parse::<LineEnding>(vars::LINE_ENDING)? {
        config.line_ending = line_ending;
    }

    config.validate()?;
    tracing::debug!(?config, prefix = %env.prefix, "loaded expect config from environment");
    Ok(config)
}
