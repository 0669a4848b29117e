//! Ingress and egress nodes of the default network.

use log::Level;

use crate::agent::Agent;
use crate::events::Event;
use crate::sketchy_log;

/// Forwards every event unchanged; the entry point transports feed.
pub struct Router;

impl Agent for Router {
    fn name(&self) -> &str {
        "router"
    }

    fn on(&self, event: Event) -> anyhow::Result<Vec<Event>> {
        Ok(vec![event])
    }
}

/// Terminal node: logs what reaches the end of the network.
pub struct Reporter;

impl Agent for Reporter {
    fn name(&self) -> &str {
        "reporter"
    }

    fn on(&self, event: Event) -> anyhow::Result<Vec<Event>> {
        match &event {
            Event::SketchyScore(s) => sketchy_log!(
                Level::Info,
                "reporter",
                "user={} kind={} signals={} state={} score={:.4} probability={:.4}",
                s.user_id,
                s.kind,
                s.signals,
                s.state,
                s.score,
                s.probability
            ),
            other => sketchy_log!(Level::Debug, "reporter", "{}", other.to_json()?),
        }
        Ok(Vec::new())
    }
}
