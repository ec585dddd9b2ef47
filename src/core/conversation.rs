use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::core::message::{PendingTicket, Turn};

/// Opaque, stable conversation identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    #[serde(rename = "messages", default)]
    pub turns: Vec<Turn>,
}

impl Conversation {
    pub fn new(id: ConversationId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            turns: Vec::new(),
        }
    }

    pub fn has_pending(&self) -> bool {
        self.turns.iter().any(Turn::is_pending)
    }

    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Index of the pending turn owned by `ticket`, or of the most recent
    /// pending turn when no turn carries that ticket.
    pub(crate) fn placeholder_index(&self, ticket: PendingTicket) -> Option<usize> {
        self.turns
            .iter()
            .position(|turn| turn.is_pending() && turn.ticket() == Some(ticket))
            .or_else(|| self.turns.iter().rposition(Turn::is_pending))
    }
}

/// Hands out timestamp-based ids that stay strictly increasing even when two
/// conversations are created within the same millisecond.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    last: i64,
}

impl IdAllocator {
    pub(crate) fn next(&mut self) -> ConversationId {
        self.next_at(Utc::now().timestamp_millis())
    }

    fn next_at(&mut self, now_millis: i64) -> ConversationId {
        let value = if now_millis > self.last {
            now_millis
        } else {
            self.last + 1
        };
        self.last = value;
        ConversationId(value.to_string())
    }

    /// Account for ids loaded from storage so new ids never collide with them.
    pub(crate) fn observe(&mut self, id: &ConversationId) {
        if let Ok(value) = id.as_str().parse::<i64>() {
            self.last = self.last.max(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Reply;

    #[test]
    fn ids_increase_within_the_same_millisecond() {
        let mut ids = IdAllocator::default();
        let first = ids.next_at(1_000);
        let second = ids.next_at(1_000);
        let third = ids.next_at(999);
        assert_eq!(first.as_str(), "1000");
        assert_eq!(second.as_str(), "1001");
        assert_eq!(third.as_str(), "1002");
    }

    #[test]
    fn observed_ids_are_never_reissued() {
        let mut ids = IdAllocator::default();
        ids.observe(&ConversationId::new("5000"));
        ids.observe(&ConversationId::new("not-a-number"));
        assert_eq!(ids.next_at(10).as_str(), "5001");
    }

    #[test]
    fn placeholder_lookup_prefers_ticket_then_most_recent() {
        let mut conversation = Conversation::new(ConversationId::new("1"), "t");
        conversation.turns.push(Turn::user("a"));
        conversation.turns.push(Turn::pending(PendingTicket(1)));
        conversation.turns.push(Turn::user("b"));
        conversation.turns.push(Turn::pending(PendingTicket(2)));

        assert_eq!(conversation.placeholder_index(PendingTicket(1)), Some(1));
        assert_eq!(conversation.placeholder_index(PendingTicket(9)), Some(3));

        conversation.turns[3].settle(Ok(Reply::text("done")));
        assert_eq!(conversation.placeholder_index(PendingTicket(9)), Some(1));
    }

    #[test]
    fn history_uses_messages_key() {
        let json = r#"{"id":"42","title":"Hello...","messages":[{"role":"user","content":"Hello"}]}"#;
        let conversation: Conversation = serde_json::from_str(json).expect("parse");
        assert_eq!(conversation.id.as_str(), "42");
        assert_eq!(conversation.turns.len(), 1);
    }
}
