//! Shared fixtures: a recording metrics sink and a few toy agents.

#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use sketchy::agent::Agent;
use sketchy::events::{Event, UserAction};
use sketchy::telemetry::{Direction, MetricsSink};

/// In-memory sink capturing every observation.
#[derive(Default)]
pub struct RecordingSink {
    pub counts:   Mutex<Vec<(Direction, String, String)>>,
    pub timings:  Mutex<Vec<(String, String)>>,
    pub failures: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn counted(&self, direction: Direction, agent: &str, kind: &str) -> usize {
        self.counts
            .lock()
            .unwrap()
            .iter()
            .filter(|(d, a, k)| *d == direction && a == agent && k == kind)
            .count()
    }

    pub fn total(&self, direction: Direction) -> usize {
        self.counts.lock().unwrap().iter().filter(|(d, _, _)| *d == direction).count()
    }
}

impl MetricsSink for RecordingSink {
    fn count(&self, direction: Direction, agent: &str, kind: &str) {
        self.counts.lock().unwrap().push((direction, agent.into(), kind.into()));
    }

    fn timing(&self, agent: &str, kind: &str, _elapsed: Duration) {
        self.timings.lock().unwrap().push((agent.into(), kind.into()));
    }

    fn failure(&self, agent: &str, kind: &str) {
        self.failures.lock().unwrap().push((agent.into(), kind.into()));
    }
}

pub fn action(tag: i64) -> Event {
    Event::UserAction(UserAction { user_ids: vec![tag] })
}

pub fn tag_of(event: &Event) -> i64 {
    match event {
        Event::UserAction(a) => a.user_ids[0],
        other => panic!("unexpected event {other:?}"),
    }
}

/// Turns any input into `outputs` user actions tagged 1..=outputs.
pub struct Splitter {
    pub name:    &'static str,
    pub outputs: i64,
}

impl Agent for Splitter {
    fn name(&self) -> &str {
        self.name
    }

    fn on(&self, _event: Event) -> anyhow::Result<Vec<Event>> {
        Ok((1..=self.outputs).map(action).collect())
    }
}

/// Appends `"<name>:<tag>"` to a shared journal and produces nothing.
pub struct Recorder {
    pub name:    &'static str,
    pub journal: Arc<Mutex<Vec<String>>>,
}

impl Agent for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn on(&self, event: Event) -> anyhow::Result<Vec<Event>> {
        self.journal.lock().unwrap().push(format!("{}:{}", self.name, tag_of(&event)));
        Ok(Vec::new())
    }
}

/// Always fails.
pub struct Failing;

impl Agent for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn on(&self, _event: Event) -> anyhow::Result<Vec<Event>> {
        anyhow::bail!("backend unavailable")
    }
}

/// Panics on the first message, records the following ones.
pub struct PanicsOnce {
    pub calls:   AtomicUsize,
    pub journal: Arc<Mutex<Vec<String>>>,
}

impl Agent for PanicsOnce {
    fn name(&self) -> &str {
        "flaky"
    }

    fn on(&self, event: Event) -> anyhow::Result<Vec<Event>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("first message blows up");
        }
        self.journal.lock().unwrap().push(format!("flaky:{}", tag_of(&event)));
        Ok(Vec::new())
    }
}

/// Poll `journal` until it holds `len` entries or `within` elapses.
pub async fn wait_for(journal: &Arc<Mutex<Vec<String>>>, len: usize, within: Duration) -> Vec<String> {
    let _ = tokio::time::timeout(within, async {
        loop {
            if journal.lock().unwrap().len() >= len {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    journal.lock().unwrap().clone()
}
