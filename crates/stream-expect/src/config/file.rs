//! File-based configuration loading.
//!
//! ```toml
//! capacity = 4096
//! timeout_ms = 500
//! line_ending = "crlf"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::{ExpectConfig, LineEnding};
use crate::error::{ExpectError, Result};

/// On-disk shape of an [`ExpectConfig`]. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    capacity: Option<usize>,
    timeout_ms: Option<u64>,
    line_ending: Option<LineEnding>,
}

impl RawConfig {
    fn into_config(self) -> ExpectConfig {
        let defaults = ExpectConfig::default();
        ExpectConfig {
            capacity: self.capacity.unwrap_or(defaults.capacity),
            timeout: self
                .timeout_ms
                .map_or(defaults.timeout, Duration::from_millis),
            line_ending: self.line_ending.unwrap_or(defaults.line_ending),
        }
    }
}

/// Parse TOML text into a validated configuration.
pub fn parse_toml(content: &str) -> Result<ExpectConfig> {
    let raw: RawConfig =
        toml::from_str(content).map_err(|e| ExpectError::config(format!("invalid TOML: {e}")))?;
    let config = raw.into_config();
    config.validate()?;
    Ok(config)
}

/// Load and parse a TOML configuration file.
pub fn load(path: &Path) -> Result<ExpectConfig> {
    let content = ExpectError::with_io_context(
        std::fs::read_to_string(path),
        format!("reading config file {}", path.display()),
    )?;
    let config = parse_toml(&content)?;
    tracing::debug!(path = %path.display(), ?config, "loaded expect config file");
    Ok(config)
}
