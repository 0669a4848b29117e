//! User-facing event variants: fan events, clock pulses, spam reports and
//! messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::traits::{Action, EventLike, MessageLike, Trustable, UserEvent};
use super::EventType;

/// "These users did something."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
    pub user_ids: Vec<i64>,
}

/// Heartbeat emitted by the clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tick {
    pub last_tick: DateTime<Utc>,
}

impl EventLike for UserAction {
    fn id(&self) -> Option<i64> {
        None
    }

    fn kind(&self) -> &str {
        EventType::UserAction.name()
    }
}

impl EventLike for Tick {
    fn id(&self) -> Option<i64> {
        None
    }

    fn kind(&self) -> &str {
        EventType::Tick.name()
    }
}

/// A user flagging another user's content. The reporter is the sender and
/// the reported spammer the recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpamReport {
    #[serde(default)]
    pub id:                Option<i64>,
    pub reporter_id:       i64,
    pub spammer_id:        i64,
    #[serde(default)]
    pub origin_id:         Option<i64>,
    pub origin_type:       String,
    pub spam_published_at: DateTime<Utc>,
    #[serde(default)]
    pub last_signaled_at:  Option<DateTime<Utc>>,
    pub created_at:        DateTime<Utc>,
    pub updated_at:        DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Action::is_create")]
    pub action:            Action,
}

impl SpamReport {
    pub fn with_action(self, action: Action) -> Self {
        Self { action, ..self }
    }
}

impl EventLike for SpamReport {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn kind(&self) -> &str {
        EventType::SpamReport.name()
    }
}

impl UserEvent for SpamReport {
    fn action(&self) -> Action {
        self.action
    }

    fn sender_id(&self) -> Option<i64> {
        Some(self.reporter_id)
    }

    fn recipient_id(&self) -> Option<i64> {
        Some(self.spammer_id)
    }

    // Reports are always evaluated, whoever files them.
    fn no_spam_check(&self) -> bool {
        false
    }
}

/// A message from one user to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub id:            Option<i64>,
    #[serde(default)]
    pub sender_id:     Option<i64>,
    #[serde(default)]
    pub recipient_id:  Option<i64>,
    pub content:       String,
    #[serde(default)]
    pub public:        Option<bool>,
    #[serde(default)]
    pub trusted:       Option<bool>,
    #[serde(default)]
    pub paying:        Option<bool>,
    #[serde(default)]
    pub age:           Option<i64>,
    #[serde(default)]
    pub interaction:   Option<bool>,
    #[serde(default)]
    pub no_spam_check: bool,
    #[serde(default)]
    pub action:        Action,
    pub created_at:    DateTime<Utc>,
}

impl Message {
    pub fn new(
        sender_id: i64,
        recipient_id: i64,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            sender_id: Some(sender_id),
            recipient_id: Some(recipient_id),
            content: content.into(),
            public: None,
            trusted: None,
            paying: None,
            age: None,
            interaction: None,
            no_spam_check: false,
            action: Action::Create,
            created_at,
        }
    }

    pub fn with_action(self, action: Action) -> Self {
        Self { action, ..self }
    }

    pub fn with_interaction(self, interaction: bool) -> Self {
        Self { interaction: Some(interaction), ..self }
    }

    pub fn with_trust(self, trusted: Option<bool>, paying: Option<bool>, age: Option<i64>) -> Self {
        Self { trusted, paying, age, ..self }
    }
}

impl EventLike for Message {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn kind(&self) -> &str {
        EventType::Message.name()
    }
}

impl UserEvent for Message {
    fn action(&self) -> Action {
        self.action
    }

    fn sender_id(&self) -> Option<i64> {
        self.sender_id
    }

    fn recipient_id(&self) -> Option<i64> {
        self.recipient_id
    }

    fn no_spam_check(&self) -> bool {
        self.no_spam_check
    }
}

impl Trustable for Message {
    fn trusted(&self) -> Option<bool> {
        self.trusted
    }

    fn paying(&self) -> Option<bool> {
        self.paying
    }

    fn age(&self) -> Option<i64> {
        self.age
    }
}

impl MessageLike for Message {
    fn content(&self) -> &str {
        &self.content
    }

    fn public(&self) -> Option<bool> {
        self.public
    }

    fn interaction(&self) -> Option<bool> {
        self.interaction
    }
}
