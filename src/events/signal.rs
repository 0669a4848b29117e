use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::traits::EventLike;
use super::{EventError, EventType};

/// One unit of raw evidence from one detector.
///
/// `kind` names the signal family ("Foo", "Spam", ...) and selects which
/// score the signal folds into; it is unrelated to the event kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SketchySignal {
    pub user_id:    i64,
    pub kind:       String,
    #[serde(default)]
    pub items:      Vec<i64>,
    pub detector:   String,
    /// In `[0, 1]`; see [`SketchySignal::validate`].
    pub strength:   f64,
    pub created_at: DateTime<Utc>,
}

impl SketchySignal {
    /// Rejects a strength outside `[0, 1]`, NaN included.
    pub fn validate(&self) -> Result<(), EventError> {
        if (0.0..=1.0).contains(&self.strength) {
            Ok(())
        } else {
            Err(EventError::InvalidStrength(self.strength))
        }
    }
}

impl EventLike for SketchySignal {
    fn id(&self) -> Option<i64> {
        None
    }

    fn kind(&self) -> &str {
        EventType::SketchySignal.name()
    }
}

/// A referenced item; carried inside other records, never propagated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SketchyItem {
    pub id:         i64,
    pub kind:       String,
    pub created_at: DateTime<Utc>,
}
