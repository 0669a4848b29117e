//! Graph edges and the changes derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::traits::{Action, EdgeLike, EventLike, UserEvent};
use super::EventType;

/// Raw edge action as it comes off the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(default)]
    pub id:               Option<i64>,
    pub source_id:        i64,
    pub sink_id:          i64,
    pub edge_kind:        String,
    #[serde(default)]
    pub graph_id:         Option<i64>,
    pub created_at:       DateTime<Utc>,
    #[serde(default)]
    pub is_bidirectional: bool,
    #[serde(default)]
    pub sender_id:        Option<i64>,
    pub was_created:      bool,
}

impl EventLike for Edge {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn kind(&self) -> &str {
        EventType::Edge.name()
    }
}

impl EdgeLike for Edge {
    fn source_id(&self) -> i64 {
        self.source_id
    }

    fn sink_id(&self) -> i64 {
        self.sink_id
    }

    fn edge_kind(&self) -> &str {
        &self.edge_kind
    }

    fn graph_id(&self) -> Option<i64> {
        self.graph_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_bidirectional(&self) -> bool {
        self.is_bidirectional
    }

    fn sender_id(&self) -> Option<i64> {
        self.sender_id
    }

    fn was_created(&self) -> bool {
        self.was_created
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    Link,
    Relink,
    Unlink,
    Backlink,
}

/// A classified edge transition, consumed by burst-style detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeChange {
    pub source_id:   i64,
    pub sink_id:     i64,
    #[serde(default)]
    pub owner_id:    Option<i64>,
    pub action_kind: String,
    pub edge_type:   EdgeType,
    pub created_at:  DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Action::is_create")]
    pub action:      Action,
}

impl EdgeChange {
    pub fn with_action(self, action: Action) -> Self {
        Self { action, ..self }
    }
}

impl EventLike for EdgeChange {
    fn id(&self) -> Option<i64> {
        None
    }

    // Detectors subscribe per action kind, so it replaces the variant name.
    fn kind(&self) -> &str {
        &self.action_kind
    }
}

impl UserEvent for EdgeChange {
    fn action(&self) -> Action {
        self.action
    }

    fn sender_id(&self) -> Option<i64> {
        self.owner_id
    }

    fn recipient_id(&self) -> Option<i64> {
        Some(self.sink_id)
    }
}
