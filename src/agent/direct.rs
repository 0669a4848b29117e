//! Synchronous propagation.
//!
//! Each produced event is pushed through every downstream node's full
//! propagation wrapper before the next one is looked at, all on the
//! caller's thread. A slow downstream agent blocks the producer, and a
//! failing one unwinds the whole chain back to the top-level caller.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use super::{propagation::instrumented, Agent, PropagationError, Propagator};
use crate::events::Event;
use crate::telemetry::MetricsSink;

pub struct Direct {
    agent:      Box<dyn Agent>,
    sink:       Arc<dyn MetricsSink>,
    downstream: Vec<Arc<dyn Propagator>>,
    running:    AtomicBool,
}

impl Direct {
    /// Leaf node with no downstream registrations.
    pub fn new(agent: impl Agent, sink: Arc<dyn MetricsSink>) -> Self {
        Self::with_downstream(agent, sink, Vec::new())
    }

    /// Node that forwards to `downstream`, in that order.
    pub fn with_downstream(
        agent: impl Agent,
        sink: Arc<dyn MetricsSink>,
        downstream: Vec<Arc<dyn Propagator>>,
    ) -> Self {
        Self {
            agent: Box::new(agent),
            sink,
            downstream,
            running: AtomicBool::new(false),
        }
    }

    pub fn downstream(&self) -> &[Arc<dyn Propagator>] {
        &self.downstream
    }

    /// Deliver one event to every downstream node, recursively.
    pub fn emit(&self, event: Option<Event>) -> Result<(), PropagationError> {
        let Some(event) = event else { return Ok(()) };
        for node in &self.downstream {
            node.on(event.clone())?;
        }
        Ok(())
    }

    fn propagate(&self, output: &[Event]) -> Result<(), PropagationError> {
        for event in output {
            self.emit(Some(event.clone()))?;
        }
        Ok(())
    }
}

impl Propagator for Direct {
    fn name(&self) -> &str {
        self.agent.name()
    }

    fn on(&self, event: Event) -> Result<Vec<Event>, PropagationError> {
        let output = instrumented(self.agent.as_ref(), self.sink.as_ref(), event)?;
        self.propagate(&output)?;
        Ok(output)
    }

    // Nothing to start: direct nodes run on their caller's stack.
    fn enable(&self) -> bool {
        if !self.running.swap(true, Ordering::AcqRel) {
            log::debug!("direct agent '{}' enabled", self.name());
        }
        true
    }

    fn is_enabled(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
