//! Event model carried through the agent network.
//!
//! Every unit of work is an [`Event`]: a closed tagged union over the
//! concrete variants below. Capabilities (`UserEvent`, `Trustable`,
//! `MessageLike`, `EdgeLike`) are small traits implemented per variant, and
//! the enum hands them out through `as_user_event`, `as_message` and
//! `as_edge` so agents can treat e.g. every user event uniformly.
//!
//! ## Formats Supported
//! - JSON via `serde`, with a `"type"` discriminator naming the variant and
//!   one camelCase field per attribute.
//!
//! ## Extension
//! To add a new event type:
//! 1. Define the struct with `Serialize`, `Deserialize` and `EventLike`
//! 2. Add a variant to `Event` and to `EventType`
//! 3. Let the compiler point at every `match` that needs the new arm

pub mod edge;
pub mod key;
pub mod signal;
pub mod traits;
pub mod user;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use edge::{Edge, EdgeChange, EdgeType};
pub use key::UserEventKey;
pub use signal::{SketchyItem, SketchySignal};
pub use traits::{Action, EdgeLike, EventLike, MessageLike, Trustable, UserEvent};
pub use user::{Message, SpamReport, Tick, UserAction};

use crate::scoring::SketchyScore;

/// Everything that can go wrong while handling event values.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("malformed user event key '{0}'")]
    MalformedKey(String),

    #[error("unknown event variant '{0}'")]
    UnknownVariant(String),

    #[error("signal strength {0} outside [0, 1]")]
    InvalidStrength(f64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Discriminator of the concrete variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    UserAction,
    Tick,
    SketchySignal,
    SpamReport,
    SketchyScore,
    EdgeChange,
    Message,
    Edge,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::UserAction,
        EventType::Tick,
        EventType::SketchySignal,
        EventType::SpamReport,
        EventType::SketchyScore,
        EventType::EdgeChange,
        EventType::Message,
        EventType::Edge,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            EventType::UserAction    => "UserAction",
            EventType::Tick          => "Tick",
            EventType::SketchySignal => "SketchySignal",
            EventType::SpamReport    => "SpamReport",
            EventType::SketchyScore  => "SketchyScore",
            EventType::EdgeChange    => "EdgeChange",
            EventType::Message       => "Message",
            EventType::Edge          => "Edge",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

/// Unified event type routed between agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    UserAction(UserAction),
    Tick(Tick),
    SketchySignal(SketchySignal),
    SpamReport(SpamReport),
    SketchyScore(SketchyScore),
    EdgeChange(EdgeChange),
    Message(Message),
    Edge(Edge),
}

impl Event {
    pub fn event_type(&self) -> EventType {
        match self {
            Event::UserAction(_)    => EventType::UserAction,
            Event::Tick(_)          => EventType::Tick,
            Event::SketchySignal(_) => EventType::SketchySignal,
            Event::SpamReport(_)    => EventType::SpamReport,
            Event::SketchyScore(_)  => EventType::SketchyScore,
            Event::EdgeChange(_)    => EventType::EdgeChange,
            Event::Message(_)       => EventType::Message,
            Event::Edge(_)          => EventType::Edge,
        }
    }

    fn as_event_like(&self) -> &dyn EventLike {
        match self {
            Event::UserAction(e)    => e,
            Event::Tick(e)          => e,
            Event::SketchySignal(e) => e,
            Event::SpamReport(e)    => e,
            Event::SketchyScore(e)  => e,
            Event::EdgeChange(e)    => e,
            Event::Message(e)       => e,
            Event::Edge(e)          => e,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.as_event_like().id()
    }

    /// Name used for metrics labels and dispatch. This is the variant name,
    /// except for `EdgeChange` which reports its action kind.
    pub fn kind(&self) -> &str {
        self.as_event_like().kind()
    }

    pub fn as_user_event(&self) -> Option<&dyn UserEvent> {
        match self {
            Event::SpamReport(e) => Some(e),
            Event::EdgeChange(e) => Some(e),
            Event::Message(e)    => Some(e),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&dyn MessageLike> {
        match self {
            Event::Message(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&dyn EdgeLike> {
        match self {
            Event::Edge(e) => Some(e),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<String, EventError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Range checks on field values that the type system cannot express.
    pub fn validate(&self) -> Result<(), EventError> {
        match self {
            Event::SketchySignal(signal) => signal.validate(),
            _ => Ok(()),
        }
    }

    /// Decodes one event, rejecting discriminators outside the known set
    /// before looking at any field, and out-of-range values after.
    pub fn from_json(s: &str) -> Result<Self, EventError> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        let tag = value.get("type").and_then(|t| t.as_str()).unwrap_or_default();
        if EventType::from_name(tag).is_none() {
            return Err(EventError::UnknownVariant(tag.to_owned()));
        }
        let event: Event = serde_json::from_value(value)?;
        event.validate()?;
        Ok(event)
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for Event {
                fn from(e: $variant) -> Self {
                    Event::$variant(e)
                }
            }
        )+
    };
}

impl_from_variant!(
    UserAction,
    Tick,
    SketchySignal,
    SpamReport,
    SketchyScore,
    EdgeChange,
    Message,
    Edge,
);
