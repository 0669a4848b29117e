// src/main.rs

//! Sketchy entry-point.
//!
//! 1. Parse configuration & set up structured logging
//! 2. Install the Prometheus exporter (optional)
//! 3. Build and enable the agent network with the configured strategy
//! 4. Feed JSON-lines events from stdin, plus periodic `Tick`s
//! 5. Stop on EOF or Ctrl-C

// ───── std / 3rd-party imports ──────────────────────────────────────────────
use chrono::Utc;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    runtime::Runtime,
    signal,
    task::JoinHandle,
};

// ───── local imports ────────────────────────────────────────────────────────
use sketchy::config::{self, Config};
use sketchy::events::{Event, Tick};
use sketchy::logging;
use sketchy::pipeline::Pipeline;
use sketchy::telemetry::{self, Metrics};

// ───── constants ────────────────────────────────────────────────────────────
const DEFAULT_CONFIG: &str = "sketchy.toml";

// ───── helpers ──────────────────────────────────────────────────────────────

/// Print an error with context and terminate the process.
macro_rules! fatal {
    ($ctx:expr, $($arg:tt)+) => {{
        eprintln!(
            "[{}][ERROR][{}] {}",
            chrono::Local::now().to_rfc3339(),
            $ctx,
            format!($($arg)+)
        );
        std::process::exit(1);
    }};
}

/// Directory that contains the running executable.
fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// First CLI argument, or `sketchy.toml` next to the executable.
fn config_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| exe_dir().join(DEFAULT_CONFIG))
}

/// Decode one input line and push it into the network. Bad lines are
/// logged and skipped.
fn ingest(pipeline: &Pipeline, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    match Event::from_json(line) {
        Ok(event) => {
            if let Err(e) = pipeline.submit(event) {
                log::error!("{}", e);
            }
        }
        Err(e) => log::warn!("skipping input line: {}", e),
    }
}

fn spawn_ticker(pipeline: Arc<Pipeline>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await; // first tick fires immediately
        loop {
            ticker.tick().await;
            if let Err(e) = pipeline.submit(Event::Tick(Tick { last_tick: Utc::now() })) {
                log::error!("{}", e);
            }
        }
    })
}

// ───── service logic ────────────────────────────────────────────────────────

async fn run(cfg: Config) -> anyhow::Result<()> {
    // 2 ─ Metrics
    if cfg.metrics.enable {
        telemetry::install_exporter(cfg.metrics.listen)?;
    }

    // 3 ─ Network
    let pipeline = Arc::new(Pipeline::build(
        cfg.pipeline.strategy,
        Arc::new(Metrics),
        cfg.pipeline.report_on_tick,
    ));
    if !pipeline.enable() {
        anyhow::bail!("failed to enable the agent network");
    }
    log::info!(
        "Network running ({:?}): {}",
        cfg.pipeline.strategy,
        pipeline.node_names().join(", ")
    );

    let ticker = cfg.pipeline.tick_interval.map(|period| spawn_ticker(pipeline.clone(), period));

    // 4 ─ Input
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => ingest(&pipeline, &line),
                None => {
                    log::info!("Input closed");
                    break;
                }
            },
            _ = &mut shutdown => {
                log::warn!("Shutdown requested");
                break;
            }
        }
    }

    // 5 ─ Drain
    if let Some(ticker) = ticker {
        ticker.abort();
        let _ = ticker.await;
    }
    match Arc::try_unwrap(pipeline) {
        Ok(pipeline) => pipeline.shutdown().await,
        Err(_) => log::warn!("Network still referenced, not waiting for workers"),
    }
    log::info!("Stopped cleanly");
    Ok(())
}

fn main() {
    // 1 ─ Context
    let path = config_path();
    let cfg = config::load(&path).unwrap_or_else(|e| fatal!("config", "{}: {}", path.display(), e));
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_else(exe_dir);

    logging::init(&base_dir, &cfg.logging).unwrap_or_else(|e| fatal!("logging", "{}", e));
    log::info!("Bootstrap initiated with {}", path.display());

    let rt = Runtime::new().unwrap_or_else(|e| fatal!("runtime", "{}", e));
    if let Err(e) = rt.block_on(run(cfg)) {
        fatal!("main", "{:#}", e);
    }
}
