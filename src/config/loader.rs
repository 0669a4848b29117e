// src/config/loader.rs

//! # Configuration Loader
//!
//! Reads the TOML file, deserializes it into `RawConfig`, and converts the
//! raw tables into the typed runtime `Config`.

use crate::config::model::{Config, ConfigError, MetricsConfig, PipelineConfig, RawConfig};
use std::{fs, net::SocketAddr, path::Path};

/// Load and parse the configuration at `path`.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    log::debug!("Reading config from {:?}", path);
    let txt = fs::read_to_string(path)?;
    let cfg = parse(&txt)?;
    log::info!("Loaded config from {:?}", path);
    Ok(cfg)
}

/// Parse configuration text; missing tables fall back to defaults.
pub fn parse(txt: &str) -> Result<Config, ConfigError> {
    let raw: RawConfig = toml::from_str(txt)?;

    let listen = raw
        .metrics
        .listen
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidAddress(raw.metrics.listen.clone(), e))?;

    let tick_interval = raw
        .pipeline
        .tick_interval
        .as_deref()
        .map(|s| humantime::parse_duration(s).map_err(|e| ConfigError::InvalidDuration(s.into(), e)))
        .transpose()?;

    Ok(Config {
        logging: raw.logging,
        metrics: MetricsConfig { enable: raw.metrics.enable, listen },
        pipeline: PipelineConfig {
            strategy: raw.pipeline.strategy.parse()?,
            tick_interval,
            report_on_tick: raw.pipeline.report_on_tick,
        },
    })
}
