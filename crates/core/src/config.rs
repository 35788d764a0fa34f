//! Configuration management for ProveVM.
//!
//! Every field has a default so a partial (or empty) TOML file is valid.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::error::{CoreError, Result};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:4001";
pub const DEFAULT_EXECUTION_TIMEOUT_MS: u64 = 120_000;
pub const DEFAULT_MAX_CONCURRENT_EXECUTIONS: usize = 8;
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

/// What happens to a project record once an execute call has read it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ConsumePolicy {
    /// The record is removed by the lookup that returns it.
    #[default]
    SingleUse,
    /// The record stays registered until overwritten.
    Reusable,
}

/// How the engine's result text is turned into response bytes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ResultEncoding {
    /// One output byte per hex character (wire-compatible with existing callers).
    #[default]
    CharBytes,
    /// Hex pairs decoded to raw bytes. Changes the wire contract.
    HexDecoded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_execution_timeout_ms")]
    pub execution_timeout_ms: u64,
    #[serde(default)]
    pub consume_policy: ConsumePolicy,
    #[serde(default)]
    pub result_encoding: ResultEncoding,
    #[serde(default = "default_max_concurrent_executions")]
    pub max_concurrent_executions: usize,
    /// Upper bound on an inflated program image
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Executable of the external proving engine
    #[serde(default = "default_engine_command")]
    pub command: String,
    /// Arguments placed before the per-call arguments
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_execution_timeout_ms() -> u64 {
    DEFAULT_EXECUTION_TIMEOUT_MS
}

fn default_max_concurrent_executions() -> usize {
    DEFAULT_MAX_CONCURRENT_EXECUTIONS
}

fn default_max_image_bytes() -> usize {
    DEFAULT_MAX_IMAGE_BYTES
}

fn default_engine_command() -> String {
    "halo2-prover".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            execution_timeout_ms: default_execution_timeout_ms(),
            consume_policy: ConsumePolicy::default(),
            result_encoding: ResultEncoding::default(),
            max_concurrent_executions: default_max_concurrent_executions(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

impl RuntimeConfig {
    pub fn execution_timeout(&self) -> Duration {
        Duration::from_millis(self.execution_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: default_engine_command(),
            args: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Config {
    #[cfg(feature = "toml")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| CoreError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self::default()
    }

    /// Parsed listen address.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.server.listen_addr.parse().map_err(|e| {
            CoreError::InvalidConfig(format!(
                "listen_addr '{}' is not a socket address: {}",
                self.server.listen_addr, e
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;

        if self.runtime.execution_timeout_ms == 0 {
            return Err(CoreError::InvalidConfig(
                "execution_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.runtime.max_concurrent_executions == 0 {
            return Err(CoreError::InvalidConfig(
                "max_concurrent_executions must be at least 1".to_string(),
            ));
        }
        if self.runtime.max_image_bytes == 0 {
            return Err(CoreError::InvalidConfig(
                "max_image_bytes must be greater than zero".to_string(),
            ));
        }
        if self.engine.command.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "engine.command must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
