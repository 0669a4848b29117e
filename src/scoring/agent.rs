//! Agent holding the running score of every (user, signal kind) pair.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use log::Level;

use super::score::SketchyScore;
use crate::agent::Agent;
use crate::events::{Event, SketchySignal, UserEventKey};
use crate::sketchy_log;

pub struct ScoringAgent {
    /// Keyed by `UserEventKey::new(signal.kind, user_id).marshal()`.
    scores:         Mutex<HashMap<String, SketchyScore>>,
    report_on_tick: bool,
}

impl ScoringAgent {
    pub fn new(report_on_tick: bool) -> Self {
        Self { scores: Mutex::new(HashMap::new()), report_on_tick }
    }

    fn key(signal: &SketchySignal) -> String {
        UserEventKey::new(signal.kind.as_str(), signal.user_id).marshal()
    }

    /// Current (undecayed) score for `user_id` and `kind`.
    pub fn score(&self, user_id: i64, kind: &str) -> Option<SketchyScore> {
        let key = UserEventKey::new(kind, user_id).marshal();
        self.scores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    fn fold(&self, signal: &SketchySignal) -> SketchyScore {
        let mut scores = self.scores.lock().unwrap_or_else(PoisonError::into_inner);
        let current = scores
            .entry(Self::key(signal))
            .or_insert_with(|| SketchyScore::new(signal.user_id, signal.kind.as_str(), signal.created_at));
        let next = current.update(signal);
        *current = next.clone();
        next
    }
}

impl Agent for ScoringAgent {
    fn name(&self) -> &str {
        "scoring"
    }

    fn on(&self, event: Event) -> anyhow::Result<Vec<Event>> {
        match event {
            Event::SketchySignal(signal) => {
                signal.validate()?;
                let score = self.fold(&signal);
                sketchy_log!(
                    Level::Debug,
                    "scoring",
                    "user {} {} via {}: score={:.4} p={:.4} state={}",
                    score.user_id,
                    score.kind,
                    signal.detector,
                    score.score,
                    score.probability,
                    score.state
                );
                Ok(vec![Event::SketchyScore(score)])
            }
            // Snapshots only: storing a decayed copy would decay it twice.
            Event::Tick(tick) if self.report_on_tick => {
                let scores = self.scores.lock().unwrap_or_else(PoisonError::into_inner);
                Ok(scores
                    .values()
                    .map(|s| Event::SketchyScore(s.decayed(tick.last_tick)))
                    .collect())
            }
            _ => Ok(Vec::new()),
        }
    }
}
