//! Marks messages that answer an earlier message in the other direction.
//!
//! Pairs are never forgotten: memory grows with the number of distinct
//! (sender, recipient) pairs, not with message volume.

use std::{
    collections::HashSet,
    sync::{Mutex, PoisonError},
};

use crate::agent::Agent;
use crate::events::{Event, Message, MessageLike, UserEvent};

#[derive(Default)]
pub struct InteractionAgent {
    /// (sender, recipient) pairs seen so far.
    seen: Mutex<HashSet<(i64, i64)>>,
}

impl InteractionAgent {
    pub fn new() -> Self {
        Self::default()
    }

    fn annotate(&self, msg: Message) -> Message {
        let (Some(sender), Some(recipient)) = (msg.sender_id(), msg.recipient_id()) else {
            return msg;
        };
        if msg.to_myself() {
            return msg;
        }
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        let reciprocal = seen.contains(&(recipient, sender));
        seen.insert((sender, recipient));
        msg.with_interaction(reciprocal)
    }
}

impl Agent for InteractionAgent {
    fn name(&self) -> &str {
        "interactions"
    }

    fn on(&self, event: Event) -> anyhow::Result<Vec<Event>> {
        match event {
            Event::Message(msg) => Ok(vec![Event::Message(self.annotate(msg))]),
            _ => Ok(Vec::new()),
        }
    }
}
