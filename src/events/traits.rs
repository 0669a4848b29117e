//! Capability traits layered over the concrete event variants.
//!
//! Variants opt into capabilities individually; [`Event`](super::Event)
//! exposes them through `as_user_event`, `as_message` and `as_edge`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::key::UserEventKey;

/// What happened to the underlying record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Action {
    #[default]
    Create,
    Destroy,
    Update,
}

impl Action {
    pub fn is_create(&self) -> bool {
        matches!(self, Action::Create)
    }
}

/// Base capability shared by every unit flowing through the network.
pub trait EventLike {
    /// Persistent identity, absent for derived events.
    fn id(&self) -> Option<i64>;

    /// Stable type discriminator used for metrics and dispatch.
    fn kind(&self) -> &str;
}

/// An action performed by or on a user.
pub trait UserEvent: EventLike {
    fn action(&self) -> Action;
    fn sender_id(&self) -> Option<i64>;
    fn recipient_id(&self) -> Option<i64>;

    /// Whether spam evaluation should be skipped for this event.
    fn no_spam_check(&self) -> bool {
        false
    }

    fn key(&self) -> UserEventKey {
        UserEventKey::new(self.kind(), self.id().unwrap_or(0))
    }
}

/// Trust metadata used to weight downstream checks.
pub trait Trustable: UserEvent {
    fn trusted(&self) -> Option<bool>;
    fn paying(&self) -> Option<bool>;
    fn age(&self) -> Option<i64>;
}

/// A directed communication with content.
pub trait MessageLike: Trustable {
    fn content(&self) -> &str;
    fn public(&self) -> Option<bool>;

    /// Part of a reciprocal sender/recipient exchange.
    fn interaction(&self) -> Option<bool>;

    fn to_myself(&self) -> bool {
        matches!(
            (self.sender_id(), self.recipient_id()),
            (Some(s), Some(r)) if s == r
        )
    }
}

/// A directed relationship between two entities at a point in time.
pub trait EdgeLike: EventLike {
    fn source_id(&self) -> i64;
    fn sink_id(&self) -> i64;
    fn edge_kind(&self) -> &str;

    /// Scopes edge history: equal edges with different graph ids are unrelated.
    fn graph_id(&self) -> Option<i64>;
    fn created_at(&self) -> DateTime<Utc>;
    fn is_bidirectional(&self) -> bool;
    fn sender_id(&self) -> Option<i64>;
    fn was_created(&self) -> bool;
}
