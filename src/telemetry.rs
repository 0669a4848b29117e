//! Metrics boundary for the propagation layer.
//!
//! The core only needs a counter and a timer sink. [`Metrics`] forwards to
//! the `metrics` facade, which the binary backs with a Prometheus exporter.

use std::{net::SocketAddr, time::Duration};

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

pub const EVENTS_TOTAL: &str = "sketchy_agent_events_total";
pub const ON_SECONDS: &str = "sketchy_agent_on_seconds";
pub const FAILURES_TOTAL: &str = "sketchy_agent_failures_total";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Incoming => "incoming",
            Direction::Outgoing => "outgoing",
        }
    }
}

/// Counter/timer sink shared by every agent; must tolerate concurrent calls
/// from several worker loops.
pub trait MetricsSink: Send + Sync {
    fn count(&self, direction: Direction, agent: &str, kind: &str);
    fn timing(&self, agent: &str, kind: &str, elapsed: Duration);
    fn failure(&self, agent: &str, kind: &str);
}

/// Sink backed by the global `metrics` recorder.
#[derive(Debug, Default, Clone, Copy)]
pub struct Metrics;

impl MetricsSink for Metrics {
    fn count(&self, direction: Direction, agent: &str, kind: &str) {
        counter!(
            EVENTS_TOTAL,
            "direction" => direction.as_str(),
            "agent" => agent.to_owned(),
            "kind" => kind.to_owned()
        )
        .increment(1);
    }

    fn timing(&self, agent: &str, kind: &str, elapsed: Duration) {
        histogram!(ON_SECONDS, "agent" => agent.to_owned(), "kind" => kind.to_owned())
            .record(elapsed.as_secs_f64());
    }

    fn failure(&self, agent: &str, kind: &str) {
        counter!(FAILURES_TOTAL, "agent" => agent.to_owned(), "kind" => kind.to_owned())
            .increment(1);
    }
}

/// Install the Prometheus recorder and serve it on `listen`.
pub fn install_exporter(listen: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(listen)
        .install()?;
    log::info!("Prometheus exporter listening on {}", listen);
    Ok(())
}
