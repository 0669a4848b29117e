//! Agent abstraction + the two propagation strategies.
//! -----------------------------------------------------------------------------
//! An **agent** is a named transformation `on(event) -> events`. It knows
//! nothing about where its output goes. A **propagator** wraps an agent,
//! records ingress/egress metrics around every `on` call and hands the
//! produced events to the downstream agents:
//!   • [`Direct`]     → synchronous, depth-first recursion on the caller's
//!     stack, in registration order.
//!   • [`Concurrent`] → every output is enqueued into each downstream
//!     agent's inbox and drained by that agent's own worker task.
//!
//! Whoever holds an event inside `on` owns it and may annotate it before
//! re-emitting; once propagated, the producer no longer has access to it.

pub mod concurrent;
pub mod direct;
pub mod propagation;

use thiserror::Error;

use crate::events::Event;

pub use concurrent::Concurrent;
pub use direct::Direct;

/// A named, independently enable-able processing node.
pub trait Agent: Send + Sync + 'static {
    /// Display name for metrics / logs.
    fn name(&self) -> &str;

    /// Transform one event into zero or more events. "Nothing to report" is
    /// an empty vector, not an error.
    fn on(&self, event: Event) -> anyhow::Result<Vec<Event>>;
}

/// Failures surfaced by a propagator, always carrying the agent and the
/// event kind it was processing.
#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("agent '{agent}' failed on {kind}: {source}")]
    Agent {
        agent:  String,
        kind:   String,
        #[source]
        source: anyhow::Error,
    },

    #[error("agent '{agent}' panicked on {kind}: {message}")]
    Panicked {
        agent:   String,
        kind:    String,
        message: String,
    },
}

impl PropagationError {
    pub fn agent(&self) -> &str {
        match self {
            PropagationError::Agent { agent, .. } | PropagationError::Panicked { agent, .. } => agent,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            PropagationError::Agent { kind, .. } | PropagationError::Panicked { kind, .. } => kind,
        }
    }
}

/// An agent wrapped with instrumentation and a delivery strategy.
pub trait Propagator: Send + Sync {
    fn name(&self) -> &str;

    /// Instrumented `on`: counts, times, runs the agent, forwards every
    /// produced event downstream and returns the produced events unchanged.
    fn on(&self, event: Event) -> Result<Vec<Event>, PropagationError>;

    /// Created → Running. Idempotent; returns whether the node is running.
    fn enable(&self) -> bool;

    fn is_enabled(&self) -> bool;
}
