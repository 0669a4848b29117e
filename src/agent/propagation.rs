//! Instrumentation shared by every propagation strategy.

use std::time::Instant;

use log::Level;

use super::{Agent, PropagationError};
use crate::events::Event;
use crate::sketchy_log;
use crate::telemetry::{Direction, MetricsSink};

/// Run `agent.on(event)` between the incoming counter/timer and one
/// outgoing counter per produced event. Forwarding is left to the caller.
pub fn instrumented(
    agent: &dyn Agent,
    sink: &dyn MetricsSink,
    event: Event,
) -> Result<Vec<Event>, PropagationError> {
    let name = agent.name();
    let kind = event.kind().to_owned();
    sink.count(Direction::Incoming, name, &kind);

    let start = Instant::now();
    let result = agent.on(event);
    sink.timing(name, &kind, start.elapsed());

    let output = result.map_err(|source| PropagationError::Agent {
        agent: name.to_owned(),
        kind: kind.clone(),
        source,
    })?;

    for produced in &output {
        sink.count(Direction::Outgoing, name, produced.kind());
    }
    sketchy_log!(Level::Trace, "propagation", "{} turned {} into {} event(s)", name, kind, output.len());
    Ok(output)
}
