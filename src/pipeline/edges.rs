//! Classifies raw edge actions into `EdgeChange`s.
//!
//! History is scoped by graph id: the same (source, sink, kind) triple in
//! two different graphs has two unrelated histories, which is what tells a
//! fresh backlink apart from a stale one.
//!
//! Unlinked edges stay in the history as inactive so that a later re-create
//! classifies as a relink. Memory therefore grows with the number of
//! distinct (graph, source, sink, kind) edges ever seen, not with traffic.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use crate::agent::Agent;
use crate::events::{Action, Edge, EdgeChange, EdgeLike, EdgeType, Event};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EdgeKey {
    graph_id:  Option<i64>,
    source_id: i64,
    sink_id:   i64,
    edge_kind: String,
}

impl EdgeKey {
    fn of(edge: &dyn EdgeLike) -> Self {
        Self {
            graph_id:  edge.graph_id(),
            source_id: edge.source_id(),
            sink_id:   edge.sink_id(),
            edge_kind: edge.edge_kind().to_owned(),
        }
    }

    fn reversed(&self) -> Self {
        Self {
            source_id: self.sink_id,
            sink_id:   self.source_id,
            ..self.clone()
        }
    }
}

/// Edge key → currently active.
#[derive(Default)]
pub struct EdgeChangeAgent {
    history: Mutex<HashMap<EdgeKey, bool>>,
}

impl EdgeChangeAgent {
    pub fn new() -> Self {
        Self::default()
    }

    fn classify(&self, edge: &dyn EdgeLike) -> EdgeType {
        let key = EdgeKey::of(edge);
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);

        if !edge.was_created() {
            history.insert(key, false);
            return EdgeType::Unlink;
        }

        let backlink = !edge.is_bidirectional()
            && history.get(&key.reversed()).copied().unwrap_or(false);
        let seen_before = history.get(&key).is_some_and(|active| !active);
        history.insert(key, true);

        if backlink {
            EdgeType::Backlink
        } else if seen_before {
            EdgeType::Relink
        } else {
            EdgeType::Link
        }
    }

    fn change(&self, edge: &Edge) -> EdgeChange {
        EdgeChange {
            source_id:   edge.source_id,
            sink_id:     edge.sink_id,
            owner_id:    edge.sender_id,
            action_kind: edge.edge_kind.clone(),
            edge_type:   self.classify(edge),
            created_at:  edge.created_at,
            action:      if edge.was_created { Action::Create } else { Action::Destroy },
        }
    }
}

impl Agent for EdgeChangeAgent {
    fn name(&self) -> &str {
        "edges"
    }

    fn on(&self, event: Event) -> anyhow::Result<Vec<Event>> {
        match event {
            Event::Edge(edge) => Ok(vec![Event::EdgeChange(self.change(&edge))]),
            _ => Ok(Vec::new()),
        }
    }
}
