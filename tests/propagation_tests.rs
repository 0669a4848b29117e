//! # Propagation Tests
//!
//! Covers the instrumentation wrapper and both delivery strategies:
//! - metrics recorded per `on` call (incoming, outgoing, timing)
//! - direct: synchronous, depth-first, registration-ordered delivery
//! - concurrent: every output reaches every downstream agent exactly once,
//!   and failures stay inside the worker that raised them

mod common;

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};

use chrono::Utc;
use sketchy::agent::{Agent, Concurrent, Direct, PropagationError, Propagator};
use sketchy::events::{Event, Tick};
use sketchy::telemetry::{Direction, MetricsSink};

use common::{action, wait_for, Failing, PanicsOnce, Recorder, RecordingSink, Splitter};

struct Clock;

impl Agent for Clock {
    fn name(&self) -> &str {
        "clock"
    }

    fn on(&self, _event: Event) -> anyhow::Result<Vec<Event>> {
        Ok(Vec::new())
    }
}

/// Records like `Recorder` and raises `dropped` when the agent goes away.
struct Tracked {
    journal: Arc<Mutex<Vec<String>>>,
    dropped: Arc<AtomicBool>,
}

impl Agent for Tracked {
    fn name(&self) -> &str {
        "tracked"
    }

    fn on(&self, event: Event) -> anyhow::Result<Vec<Event>> {
        self.journal.lock().unwrap().push(format!("tracked:{}", common::tag_of(&event)));
        Ok(Vec::new())
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

/// Blocks its thread for a while on every message.
struct Sleeper;

impl Agent for Sleeper {
    fn name(&self) -> &str {
        "sleeper"
    }

    fn on(&self, _event: Event) -> anyhow::Result<Vec<Event>> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(Vec::new())
    }
}

fn journal() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

#[test]
fn tick_without_output_counts_one_incoming() {
    let sink = Arc::new(RecordingSink::default());
    let clock = Direct::new(Clock, sink.clone());

    let out = clock.on(Event::Tick(Tick { last_tick: Utc::now() })).unwrap();

    assert!(out.is_empty());
    assert_eq!(sink.counted(Direction::Incoming, "clock", "Tick"), 1);
    assert_eq!(sink.total(Direction::Incoming), 1);
    assert_eq!(sink.total(Direction::Outgoing), 0);
    assert_eq!(*sink.timings.lock().unwrap(), vec![("clock".to_string(), "Tick".to_string())]);
}

#[test]
fn outgoing_counted_per_produced_event() {
    let sink = Arc::new(RecordingSink::default());
    let splitter = Direct::new(Splitter { name: "a", outputs: 3 }, sink.clone());

    let out = splitter.on(action(0)).unwrap();

    assert_eq!(out.len(), 3);
    assert_eq!(sink.counted(Direction::Incoming, "a", "UserAction"), 1);
    assert_eq!(sink.counted(Direction::Outgoing, "a", "UserAction"), 3);
}

#[test]
fn direct_delivers_depth_first_in_registration_order() {
    let sink: Arc<dyn MetricsSink> = Arc::new(RecordingSink::default());
    let log = journal();
    let b: Arc<dyn Propagator> = Arc::new(Direct::new(Recorder { name: "b", journal: log.clone() }, sink.clone()));
    let c: Arc<dyn Propagator> = Arc::new(Direct::new(Recorder { name: "c", journal: log.clone() }, sink.clone()));
    let a = Direct::with_downstream(Splitter { name: "a", outputs: 2 }, sink, vec![b, c]);

    let out = a.on(action(0)).unwrap();

    // Everything already happened by the time `on` returned.
    assert_eq!(out.len(), 2);
    assert_eq!(*log.lock().unwrap(), vec!["b:1", "c:1", "b:2", "c:2"]);
}

#[test]
fn direct_chains_recurse_through_every_level() {
    let sink = Arc::new(RecordingSink::default());
    let log = journal();
    let leaf: Arc<dyn Propagator> = Arc::new(Direct::new(Recorder { name: "leaf", journal: log.clone() }, sink.clone()));
    let middle: Arc<dyn Propagator> =
        Arc::new(Direct::with_downstream(Splitter { name: "middle", outputs: 2 }, sink.clone(), vec![leaf]));
    let top = Direct::with_downstream(Splitter { name: "top", outputs: 2 }, sink.clone(), vec![middle]);

    top.on(action(0)).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["leaf:1", "leaf:2", "leaf:1", "leaf:2"]);
    assert_eq!(sink.counted(Direction::Incoming, "middle", "UserAction"), 2);
    assert_eq!(sink.counted(Direction::Incoming, "leaf", "UserAction"), 4);
}

#[test]
fn direct_emit_none_is_a_no_op() {
    let sink = Arc::new(RecordingSink::default());
    let log = journal();
    let b: Arc<dyn Propagator> = Arc::new(Direct::new(Recorder { name: "b", journal: log.clone() }, sink.clone()));
    let a = Direct::with_downstream(Splitter { name: "a", outputs: 1 }, sink.clone(), vec![b]);

    a.emit(None).unwrap();
    a.emit(Some(action(9))).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["b:9"]);
    assert_eq!(sink.total(Direction::Incoming), 1);
}

#[test]
fn direct_failure_reaches_the_caller_with_context() {
    let sink = Arc::new(RecordingSink::default());
    let failing: Arc<dyn Propagator> = Arc::new(Direct::new(Failing, sink.clone()));
    let a = Direct::with_downstream(Splitter { name: "a", outputs: 1 }, sink.clone(), vec![failing]);

    let err = a.on(action(0)).unwrap_err();

    assert!(matches!(&err, PropagationError::Agent { agent, kind, .. } if agent == "failing" && kind == "UserAction"));
    assert!(err.to_string().contains("backend unavailable"));
    assert_eq!(sink.total(Direction::Outgoing), 1, "only the splitter produced output");
}

#[test]
fn direct_enable_is_idempotent() {
    let node = Direct::new(Clock, Arc::new(RecordingSink::default()));
    assert!(!node.is_enabled());
    assert!(node.enable());
    assert!(node.enable());
    assert!(node.is_enabled());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_delivers_every_output_exactly_once() {
    let sink: Arc<dyn MetricsSink> = Arc::new(RecordingSink::default());
    let log = journal();
    let b = Concurrent::new(Recorder { name: "b", journal: log.clone() }, sink.clone());
    let c = Concurrent::new(Recorder { name: "c", journal: log.clone() }, sink.clone());
    let a = Concurrent::with_downstream(Splitter { name: "a", outputs: 2 }, sink, vec![b.clone(), c.clone()]);
    assert!(a.enable() && b.enable() && c.enable());

    let out = a.on(action(0)).unwrap();
    assert_eq!(out.len(), 2);

    let mut seen = wait_for(&log, 4, Duration::from_secs(2)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(log.lock().unwrap().len(), 4, "no duplicates after settling");

    seen.sort();
    assert_eq!(seen, vec!["b:1", "b:2", "c:1", "c:2"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_send_goes_through_the_worker() {
    let sink = Arc::new(RecordingSink::default());
    let log = journal();
    let b = Concurrent::new(Recorder { name: "b", journal: log.clone() }, sink.clone());
    let a = Concurrent::with_downstream(Splitter { name: "a", outputs: 3 }, sink.clone(), vec![b.clone()]);
    assert_eq!(a.agents().len(), 1);

    // Queued before the workers exist; delivered once they start.
    a.send(action(0));
    assert!(log.lock().unwrap().is_empty());
    assert!(a.enable());
    assert!(b.enable());

    let seen = wait_for(&log, 3, Duration::from_secs(2)).await;
    // Same sender, same recipient: FIFO.
    assert_eq!(seen, vec!["b:1", "b:2", "b:3"]);
    assert_eq!(sink.counted(Direction::Incoming, "a", "UserAction"), 1);
    assert_eq!(sink.counted(Direction::Outgoing, "a", "UserAction"), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_panic_stays_in_the_faulting_worker() {
    let sink = Arc::new(RecordingSink::default());
    let log = journal();
    let flaky = Concurrent::new(PanicsOnce { calls: AtomicUsize::new(0), journal: log.clone() }, sink.clone());
    let steady = Concurrent::new(Recorder { name: "steady", journal: log.clone() }, sink.clone());
    let a = Concurrent::with_downstream(Splitter { name: "a", outputs: 2 }, sink.clone(), vec![flaky.clone(), steady.clone()]);
    assert!(flaky.enable() && steady.enable());

    // The producer sees no error even though a downstream worker panics.
    assert_eq!(a.on(action(0)).unwrap().len(), 2);

    let mut seen = wait_for(&log, 3, Duration::from_secs(2)).await;
    seen.sort();
    assert_eq!(seen, vec!["flaky:2", "steady:1", "steady:2"]);
    assert_eq!(*sink.failures.lock().unwrap(), vec![("flaky".to_string(), "UserAction".to_string())]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_enable_is_idempotent() {
    let node = Concurrent::new(Clock, Arc::new(RecordingSink::default()));
    assert!(!node.is_enabled());
    assert!(node.enable());
    assert!(node.enable());
    assert!(node.clone().is_enabled());
}

#[test]
fn concurrent_enable_needs_a_runtime() {
    let node = Concurrent::new(Clock, Arc::new(RecordingSink::default()));
    assert!(!node.enable());
    assert!(!node.is_enabled());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dropping_every_handle_drains_and_stops_the_worker() {
    let log = journal();
    let dropped = Arc::new(AtomicBool::new(false));
    let node = Concurrent::new(
        Tracked { journal: log.clone(), dropped: dropped.clone() },
        Arc::new(RecordingSink::default()),
    );
    assert!(node.enable());
    for tag in 1..=3 {
        node.send(action(tag));
    }

    let worker = node.take_worker().expect("enabled node has a worker");
    assert!(node.take_worker().is_none());
    drop(node);

    tokio::time::timeout(Duration::from_secs(2), worker)
        .await
        .expect("worker still running after its handles were dropped")
        .unwrap();
    assert!(dropped.load(Ordering::SeqCst), "agent outlived its worker");
    assert_eq!(*log.lock().unwrap(), vec!["tracked:1", "tracked:2", "tracked:3"]);
}

#[test]
fn dropping_an_idle_node_releases_the_agent() {
    let dropped = Arc::new(AtomicBool::new(false));
    let node = Concurrent::new(
        Tracked { journal: journal(), dropped: dropped.clone() },
        Arc::new(RecordingSink::default()),
    );
    drop(node);
    assert!(dropped.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "current_thread")]
async fn blocking_agent_does_not_stall_the_runtime() {
    let node = Concurrent::new(Sleeper, Arc::new(RecordingSink::default()));
    assert!(node.enable());
    node.send(action(1));

    // Yield so the worker picks the message up, then time a short sleep.
    tokio::task::yield_now().await;
    let started = Instant::now();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(started.elapsed() < Duration::from_millis(200), "took {:?}", started.elapsed());
}
