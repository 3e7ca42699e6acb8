#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `nettf-config` loads the optional TOML configuration file consulted by
//! the CLI front-end (not the core engine, which takes no environment
//! variables per its external-interfaces contract). Every field has a
//! sensible default, so a missing file or a missing key is never fatal —
//! only a malformed file is.
//!
//! # Design
//!
//! [`Config::load`] reads and parses a file with [`toml`] into [`Config`],
//! falling back field-by-field via `#[serde(default)]`. [`Config::default`]
//! is what the CLI uses when no `--config` path is given and no file exists
//! at the conventional location.

use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default TCP port the receiver binds, per the external-interfaces
/// contract: `9876`.
pub const DEFAULT_PORT: u16 = 9876;

/// Default discovery scan timeout.
pub const DEFAULT_DISCOVERY_TIMEOUT_MS: u64 = 500;

/// Default initial adaptive chunk size, mirroring
/// [`nettf_chunker::INITIAL_CHUNK_SIZE`] without requiring a dependency on
/// that crate from the config layer.
pub const DEFAULT_CHUNK_INITIAL: u32 = 64 * 1024;

/// Errors returned by [`Config::load`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file's contents were not valid TOML, or did not
    /// match the expected shape.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that was attempted.
        path: String,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },
}

/// Parsed CLI front-end configuration.
///
/// Every field is optional in the TOML source; omitted keys take the
/// defaults documented on each field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the `receive` subcommand binds when no `--bind` override is
    /// given. Defaults to `0.0.0.0`.
    pub listen_addr: Ipv4Addr,
    /// Port the `receive` subcommand binds. Defaults to [`DEFAULT_PORT`].
    pub listen_port: u16,
    /// Initial chunk size handed to a fresh `AdaptiveState`, in bytes.
    /// Defaults to [`DEFAULT_CHUNK_INITIAL`].
    pub default_chunk_initial: u32,
    /// Timeout, in milliseconds, the `discover` subcommand waits per host
    /// before giving up on it. Defaults to [`DEFAULT_DISCOVERY_TIMEOUT_MS`].
    pub discovery_timeout_ms: u64,
    /// Verbosity passed to [`nettf_logging::init`]. Defaults to `"normal"`.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: Ipv4Addr::UNSPECIFIED,
            listen_port: DEFAULT_PORT,
            default_chunk_initial: DEFAULT_CHUNK_INITIAL,
            discovery_timeout_ms: DEFAULT_DISCOVERY_TIMEOUT_MS,
            log_level: "normal".to_owned(),
        }
    }
}

impl Config {
    /// Returns [`Config::discovery_timeout_ms`] as a [`Duration`].
    #[must_use]
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    /// Loads configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if `path` cannot be read and
    /// [`ConfigError::Parse`] if its contents are not valid TOML matching
    /// [`Config`]'s shape.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Loads configuration from `path` if it exists, otherwise returns the
    /// default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for any read failure other than the file
    /// not existing, and [`ConfigError::Parse`] for malformed contents.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(other) => Err(other),
        }
    }
}
