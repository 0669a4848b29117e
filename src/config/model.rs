// src/config/model.rs

use serde::Deserialize;
use std::{net::SocketAddr, str::FromStr, time::Duration};
use thiserror::Error;

/// Top-level runtime config
#[derive(Debug, Clone)]
pub struct Config {
    pub logging:  LoggingConfig,
    pub metrics:  MetricsConfig,
    pub pipeline: PipelineConfig,
}

/// Mirror of the whole TOML file before conversion
#[derive(Debug, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub logging:  LoggingConfig,
    #[serde(default)]
    pub metrics:  RawMetrics,
    #[serde(default)]
    pub pipeline: RawPipeline,
}

/// Mirror of the `[logging]` table
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]            pub enable: bool,
    #[serde(default)]            pub file:   Option<String>,
    #[serde(default = "default_level")] pub level: String,
}
fn default_level() -> String { "INFO".into() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enable: false, file: None, level: default_level() }
    }
}

/// Raw `[metrics]` table
#[derive(Debug, Deserialize)]
pub struct RawMetrics {
    #[serde(default)]                    pub enable: bool,
    #[serde(default = "default_listen")] pub listen: String,
}
fn default_listen() -> String { "127.0.0.1:9000".into() }

impl Default for RawMetrics {
    fn default() -> Self {
        Self { enable: false, listen: default_listen() }
    }
}

/// Fully-typed `[metrics]` table
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub enable: bool,
    pub listen: SocketAddr,
}

/// Raw `[pipeline]` table
#[derive(Debug, Deserialize)]
pub struct RawPipeline {
    #[serde(default = "default_strategy")] pub strategy:       String,
    #[serde(default)]                      pub tick_interval:  Option<String>,
    #[serde(default = "default_true")]     pub report_on_tick: bool,
}
fn default_strategy() -> String { "direct".into() }
fn default_true() -> bool { true }

impl Default for RawPipeline {
    fn default() -> Self {
        Self { strategy: default_strategy(), tick_interval: None, report_on_tick: true }
    }
}

/// Fully-typed `[pipeline]` table
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub strategy:       Strategy,
    pub tick_interval:  Option<Duration>,
    pub report_on_tick: bool,
}

/// How agents hand their output to downstream agents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    Concurrent,
}

/// All the ways config loading can go wrong
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid strategy '{0}'")]
    InvalidStrategy(String),

    #[error("invalid duration '{0}': {1}")]
    InvalidDuration(String, #[source] humantime::DurationError),

    #[error("invalid listen address '{0}': {1}")]
    InvalidAddress(String, #[source] std::net::AddrParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Allow `"Concurrent"` → `Strategy::Concurrent`
impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct"     => Ok(Strategy::Direct),
            "concurrent" => Ok(Strategy::Concurrent),
            other        => Err(ConfigError::InvalidStrategy(other.into())),
        }
    }
}
