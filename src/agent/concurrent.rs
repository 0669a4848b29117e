//! Asynchronous fan-out propagation.
//!
//! Every `Concurrent` node owns an unbounded inbox drained by a single
//! worker task (spawned by `enable`). Producing an event enqueues one copy
//! per downstream node and returns immediately:
//!   • FIFO holds per sender → recipient pair only;
//!   • siblings receive the same event in no particular order;
//!   • a failure or panic inside one worker is logged, counted and
//!     swallowed there, never reaching the producer or its siblings.
//!
//! Only handles hold the inbox sender. Once every handle to a node is gone
//! its worker drains what is queued and exits, dropping the agent and its
//! own downstream handles, so shutdown cascades along the network.
//!
//! Inboxes are unbounded; bounding ingress is the transport's job.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use log::Level;
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};

use super::{propagation::instrumented, Agent, PropagationError, Propagator};
use crate::events::Event;
use crate::sketchy_log;
use crate::telemetry::MetricsSink;

/// Worker-side state. Holds no sender to its own inbox.
struct Node {
    agent:      Box<dyn Agent>,
    sink:       Arc<dyn MetricsSink>,
    downstream: Vec<Concurrent>,
    /// Receiving end, parked here until the worker takes it.
    pending:    Mutex<Option<mpsc::UnboundedReceiver<Event>>>,
    worker:     Mutex<Option<JoinHandle<()>>>,
    running:    AtomicBool,
}

impl Node {
    fn name(&self) -> &str {
        self.agent.name()
    }

    fn on(&self, event: Event) -> Result<Vec<Event>, PropagationError> {
        let output = instrumented(self.agent.as_ref(), self.sink.as_ref(), event)?;
        for produced in &output {
            for node in &self.downstream {
                node.send(produced.clone());
            }
        }
        Ok(output)
    }

    /// Process one inbox message with panic isolation.
    fn dispatch(&self, event: Event) -> Result<(), PropagationError> {
        let kind = event.kind().to_owned();
        match panic::catch_unwind(AssertUnwindSafe(|| self.on(event))) {
            Ok(result) => result.map(|_| ()),
            Err(payload) => Err(PropagationError::Panicked {
                agent: self.name().to_owned(),
                kind,
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

/// Cheap to clone handle; clones address the same worker.
#[derive(Clone)]
pub struct Concurrent {
    node:  Arc<Node>,
    inbox: mpsc::UnboundedSender<Event>,
}

impl Concurrent {
    pub fn new(agent: impl Agent, sink: Arc<dyn MetricsSink>) -> Self {
        Self::with_downstream(agent, sink, Vec::new())
    }

    pub fn with_downstream(
        agent: impl Agent,
        sink: Arc<dyn MetricsSink>,
        downstream: Vec<Concurrent>,
    ) -> Self {
        let (inbox, rx) = mpsc::unbounded_channel();
        Self {
            node: Arc::new(Node {
                agent: Box::new(agent),
                sink,
                downstream,
                pending: Mutex::new(Some(rx)),
                worker: Mutex::new(None),
                running: AtomicBool::new(false),
            }),
            inbox,
        }
    }

    /// Downstream nodes every produced event is sent to.
    pub fn agents(&self) -> &[Concurrent] {
        &self.node.downstream
    }

    /// Fire-and-forget delivery into this node's inbox. Events sent before
    /// `enable` wait there until the worker starts.
    pub fn send(&self, event: Event) {
        if self.inbox.send(event).is_err() {
            sketchy_log!(Level::Warn, "concurrent", "inbox of '{}' is closed, event dropped", self.name());
        }
    }

    /// Take the worker's join handle, once. Awaiting it after every handle
    /// to the node is dropped waits for the inbox to drain.
    pub fn take_worker(&self) -> Option<JoinHandle<()>> {
        self.node.worker.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    async fn run(node: Arc<Node>, mut rx: mpsc::UnboundedReceiver<Event>) {
        sketchy_log!(Level::Info, "concurrent", "worker for '{}' started", node.name());
        while let Some(event) = rx.recv().await {
            // `on` is synchronous and may block; keep it off the async workers.
            let job = node.clone();
            let result = match tokio::task::spawn_blocking(move || job.dispatch(event)).await {
                Ok(result) => result,
                Err(e) => {
                    sketchy_log!(Level::Error, "concurrent", "worker for '{}' lost a message: {}", node.name(), e);
                    continue;
                }
            };
            if let Err(e) = result {
                node.sink.failure(e.agent(), e.kind());
                sketchy_log!(Level::Error, "concurrent", "{}", e);
            }
        }
        sketchy_log!(Level::Info, "concurrent", "worker for '{}' terminated - inbox closed", node.name());
    }
}

impl Propagator for Concurrent {
    fn name(&self) -> &str {
        self.node.name()
    }

    fn on(&self, event: Event) -> Result<Vec<Event>, PropagationError> {
        self.node.on(event)
    }

    /// Spawn the worker on the current tokio runtime. Fails outside one.
    fn enable(&self) -> bool {
        let Ok(handle) = Handle::try_current() else {
            sketchy_log!(Level::Error, "concurrent", "cannot start '{}' outside a tokio runtime", self.name());
            return self.is_enabled();
        };

        let rx = {
            let mut pending = self.node.pending.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(rx) = pending.take() else {
                return true;
            };
            self.node.running.store(true, Ordering::Release);
            rx
        };

        let worker = handle.spawn(Self::run(self.node.clone(), rx));
        *self.node.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(worker);
        true
    }

    fn is_enabled(&self) -> bool {
        self.node.running.load(Ordering::Acquire)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
