//! Default agent network.
//!
//! ```text
//!            ┌─► edges ────────┐
//!  router ───┼─► interactions ─┼─► reporter
//!            └─► scoring ──────┘
//! ```
//! The same topology is built with either propagation strategy.

pub mod edges;
pub mod interactions;
pub mod router;

use std::sync::Arc;

use log::Level;

use crate::agent::{Concurrent, Direct, PropagationError, Propagator};
use crate::config::Strategy;
use crate::events::Event;
use crate::scoring::ScoringAgent;
use crate::sketchy_log;
use crate::telemetry::MetricsSink;

pub use edges::EdgeChangeAgent;
pub use interactions::InteractionAgent;
pub use router::{Reporter, Router};

enum Ingress {
    Direct(Arc<Direct>),
    Concurrent(Concurrent),
}

pub struct Pipeline {
    ingress: Ingress,
    nodes:   Vec<Arc<dyn Propagator>>,
    /// Concurrent handles in topological order; empty for direct pipelines.
    workers: Vec<Concurrent>,
}

impl Pipeline {
    pub fn build(strategy: Strategy, sink: Arc<dyn MetricsSink>, report_on_tick: bool) -> Self {
        match strategy {
            Strategy::Direct => Self::direct(sink, report_on_tick),
            Strategy::Concurrent => Self::concurrent(sink, report_on_tick),
        }
    }

    fn direct(sink: Arc<dyn MetricsSink>, report_on_tick: bool) -> Self {
        let reporter: Arc<dyn Propagator> = Arc::new(Direct::new(Reporter, sink.clone()));
        let middle: Vec<Arc<dyn Propagator>> = vec![
            Arc::new(Direct::with_downstream(EdgeChangeAgent::new(), sink.clone(), vec![reporter.clone()])),
            Arc::new(Direct::with_downstream(InteractionAgent::new(), sink.clone(), vec![reporter.clone()])),
            Arc::new(Direct::with_downstream(ScoringAgent::new(report_on_tick), sink.clone(), vec![reporter.clone()])),
        ];
        let router = Arc::new(Direct::with_downstream(Router, sink, middle.clone()));

        let mut nodes: Vec<Arc<dyn Propagator>> = vec![router.clone()];
        nodes.extend(middle);
        nodes.push(reporter);
        Self { ingress: Ingress::Direct(router), nodes, workers: Vec::new() }
    }

    fn concurrent(sink: Arc<dyn MetricsSink>, report_on_tick: bool) -> Self {
        let reporter = Concurrent::new(Reporter, sink.clone());
        let middle = vec![
            Concurrent::with_downstream(EdgeChangeAgent::new(), sink.clone(), vec![reporter.clone()]),
            Concurrent::with_downstream(InteractionAgent::new(), sink.clone(), vec![reporter.clone()]),
            Concurrent::with_downstream(ScoringAgent::new(report_on_tick), sink.clone(), vec![reporter.clone()]),
        ];
        let router = Concurrent::with_downstream(Router, sink, middle.clone());

        let mut workers = vec![router.clone()];
        workers.extend(middle);
        workers.push(reporter);
        let nodes = workers.iter().map(|n| Arc::new(n.clone()) as Arc<dyn Propagator>).collect();
        Self { ingress: Ingress::Concurrent(router), nodes, workers }
    }

    /// Enable every node; concurrent nodes need a tokio runtime here.
    pub fn enable(&self) -> bool {
        self.nodes.iter().fold(true, |ok, node| node.enable() && ok)
    }

    /// Feed one event into the router. Direct pipelines return once the
    /// whole network has processed it; concurrent ones return immediately.
    pub fn submit(&self, event: Event) -> Result<(), PropagationError> {
        match &self.ingress {
            Ingress::Direct(router) => router.on(event).map(|_| ()),
            Ingress::Concurrent(router) => {
                router.send(event);
                Ok(())
            }
        }
    }

    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name()).collect()
    }

    /// Drop every handle into the network and wait for the workers to drain
    /// their inboxes. Returns immediately for direct pipelines.
    pub async fn shutdown(self) {
        let workers: Vec<_> = self.workers.iter().filter_map(Concurrent::take_worker).collect();
        drop(self);
        for worker in workers {
            if let Err(e) = worker.await {
                sketchy_log!(Level::Error, "pipeline", "worker did not stop cleanly: {}", e);
            }
        }
    }
}
