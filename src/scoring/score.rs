//! Per-user abuse estimate folded from a stream of signals.
//!
//! Two quantities decay with a fixed half-life:
//! - `state`, a discrete severity counter losing one step per elapsed
//!   half-life (linear, floored at zero);
//! - `score`, the weighted evidence, halving every half-life.
//!
//! `probability` is derived from `score` with a constant prior weight
//! added to the raw score (linear odds), not a multiplicative Bayesian
//! update.
//!
//! Signals are expected in `created_at` order. An older signal yields
//! negative elapsed days, which inflates instead of decaying; this is
//! left as is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::{EventLike, EventType, SketchySignal};

/// Prior abuse probability.
pub const PRIOR: f64 = 0.1;

/// Decay half-life, in days.
pub const HALF_LIFE: f64 = 30.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SketchyScore {
    pub user_id:          i64,
    pub kind:             String,
    pub signals:          u64,
    pub state:            i64,
    pub score:            f64,
    pub probability:      f64,
    pub last_signaled_at: DateTime<Utc>,
    pub created_at:       DateTime<Utc>,
}

/// `posterior / (1 + posterior)` with `posterior = score + prior / (1 - prior)`.
pub fn probability_of(score: f64) -> f64 {
    let posterior = score + PRIOR / (1.0 - PRIOR);
    posterior / (1.0 + posterior)
}

impl SketchyScore {
    /// Empty score for `user_id`/`kind`, as if last signaled at `at`.
    pub fn new(user_id: i64, kind: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            kind: kind.into(),
            signals: 0,
            state: 0,
            score: 0.0,
            probability: probability_of(0.0),
            last_signaled_at: at,
            created_at: at,
        }
    }

    /// Fractional 24h days since the last signal.
    pub fn days_passed(&self, as_of: DateTime<Utc>) -> f64 {
        (as_of - self.last_signaled_at).num_milliseconds() as f64 / MILLIS_PER_DAY
    }

    pub fn decayed_state(&self, as_of: DateTime<Utc>) -> i64 {
        let steps = (self.days_passed(as_of) / HALF_LIFE).floor() as i64;
        (self.state - steps).max(0)
    }

    pub fn decayed_score(&self, as_of: DateTime<Utc>) -> f64 {
        self.score * 2f64.powf(-self.days_passed(as_of) / HALF_LIFE)
    }

    /// Snapshot of this score as seen at `as_of`. `last_signaled_at` is
    /// kept, so a decayed copy must not be folded into again.
    pub fn decayed(&self, as_of: DateTime<Utc>) -> Self {
        let score = self.decayed_score(as_of);
        Self {
            state: self.decayed_state(as_of),
            score,
            probability: probability_of(score),
            ..self.clone()
        }
    }

    /// Folds one signal in. The first two signals never raise `state`.
    pub fn update(&self, signal: &SketchySignal) -> Self {
        let state = if self.signals < 2 {
            0
        } else {
            self.decayed_state(signal.created_at) + 1
        };
        let score = self.decayed_score(signal.created_at) + signal.strength;
        Self {
            signals: self.signals + 1,
            state,
            score,
            probability: probability_of(score),
            last_signaled_at: signal.created_at,
            ..self.clone()
        }
    }
}

impl EventLike for SketchyScore {
    fn id(&self) -> Option<i64> {
        None
    }

    fn kind(&self) -> &str {
        EventType::SketchyScore.name()
    }
}
