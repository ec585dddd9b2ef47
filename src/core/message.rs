use serde::{Deserialize, Serialize};

/// Who authored a turn. Serialized as `"user"` / `"model"` to match the
/// history format already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Speaker {
    User,
    Model,
}

impl Speaker {
    pub fn as_str(self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Model => "model",
        }
    }

    pub fn is_user(self) -> bool {
        self == Speaker::User
    }

    pub fn is_model(self) -> bool {
        self == Speaker::Model
    }
}

impl TryFrom<&str> for Speaker {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Speaker::User),
            // Older histories used the chat-completions name for the same role.
            "model" | "assistant" => Ok(Speaker::Model),
            _ => Err(format!("invalid speaker: {value}")),
        }
    }
}

impl TryFrom<String> for Speaker {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Speaker> for String {
    fn from(value: Speaker) -> Self {
        value.as_str().to_string()
    }
}

/// A grounding source attached to a model turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub url: String,
    #[serde(default)]
    pub label: String,
}

impl Citation {
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
        }
    }
}

/// Lifecycle of a model turn: `Pending` until the collaborator answers, then
/// `Resolved` or `Failed`. Transitions never go back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    Pending,
    #[default]
    Resolved,
    Failed,
}

impl TurnStatus {
    pub fn is_resolved(&self) -> bool {
        matches!(self, TurnStatus::Resolved)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TurnStatus::Pending)
    }
}

/// Identifies the dispatcher invocation that owns a pending turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingTicket(pub u64);

/// Finished content for a model turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    pub citations: Vec<Citation>,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            citations: Vec::new(),
        }
    }

    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }
}

/// Result of a collaborator call as applied to a placeholder. The error side
/// is the human-readable failure message.
pub type TurnOutcome = Result<Reply, String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    #[serde(rename = "role")]
    pub speaker: Speaker,
    pub content: String,
    #[serde(default, rename = "sources", skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "TurnStatus::is_resolved")]
    pub status: TurnStatus,
    #[serde(skip)]
    pub(crate) ticket: Option<PendingTicket>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
            citations: Vec::new(),
            status: TurnStatus::Resolved,
            ticket: None,
        }
    }

    pub fn pending(ticket: PendingTicket) -> Self {
        Self {
            speaker: Speaker::Model,
            content: String::new(),
            citations: Vec::new(),
            status: TurnStatus::Pending,
            ticket: Some(ticket),
        }
    }

    pub fn model(reply: Reply) -> Self {
        Self {
            speaker: Speaker::Model,
            content: reply.content,
            citations: reply.citations,
            status: TurnStatus::Resolved,
            ticket: None,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            speaker: Speaker::Model,
            content: format!("Error: {message}"),
            citations: Vec::new(),
            status: TurnStatus::Failed,
            ticket: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    pub fn ticket(&self) -> Option<PendingTicket> {
        self.ticket
    }

    /// Moves a pending turn to its final state. Returns false when the turn
    /// was already settled.
    pub fn settle(&mut self, outcome: TurnOutcome) -> bool {
        if !self.is_pending() {
            return false;
        }
        *self = match outcome {
            Ok(reply) => Turn::model(reply),
            Err(message) => Turn::failed(&message),
        };
        true
    }
}

// Tickets are runtime-only and do not take part in equality.
impl PartialEq for Turn {
    fn eq(&self, other: &Self) -> bool {
        self.speaker == other.speaker
            && self.content == other.content
            && self.citations == other.citations
            && self.status == other.status
    }
}

impl Eq for Turn {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_assistant_role_is_read_as_model() {
        let turn: Turn = serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#)
            .expect("legacy turn parses");
        assert_eq!(turn.speaker, Speaker::Model);
        assert!(turn.status.is_resolved());
    }

    #[test]
    fn invalid_speaker_strings_are_rejected() {
        assert!(Speaker::try_from("system").is_err());
        assert!(serde_json::from_str::<Turn>(r#"{"role":"tool","content":""}"#).is_err());
    }

    #[test]
    fn resolved_turns_omit_status_and_empty_sources() {
        let json = serde_json::to_string(&Turn::user("hello")).expect("serialize");
        assert_eq!(json, r#"{"role":"user","content":"hello"}"#);
    }

    #[test]
    fn pending_turn_keeps_status_but_not_ticket() {
        let json = serde_json::to_string(&Turn::pending(PendingTicket(7))).expect("serialize");
        assert_eq!(json, r#"{"role":"model","content":"","status":"pending"}"#);

        let back: Turn = serde_json::from_str(&json).expect("parse");
        assert!(back.is_pending());
        assert_eq!(back.ticket(), None);
        assert_eq!(back, Turn::pending(PendingTicket(7)));
    }

    #[test]
    fn settle_failure_prefixes_error() {
        let mut turn = Turn::pending(PendingTicket(1));
        assert!(turn.settle(Err("rate limited".into())));
        assert_eq!(turn.content, "Error: rate limited");
        assert_eq!(turn.status, TurnStatus::Failed);
    }

    #[test]
    fn settled_turns_ignore_later_outcomes() {
        let mut turn = Turn::pending(PendingTicket(1));
        assert!(turn.settle(Ok(Reply::text("first"))));
        assert!(!turn.settle(Ok(Reply::text("second"))));
        assert_eq!(turn.content, "first");
    }

    #[test]
    fn citations_serialize_under_sources() {
        let turn = Turn::model(
            Reply::text("see refs").with_citations(vec![Citation::new("https://a.test", "A")]),
        );
        let value = serde_json::to_value(&turn).expect("serialize");
        assert_eq!(value["sources"][0]["url"], "https://a.test");
        assert_eq!(value["sources"][0]["label"], "A");
    }
}
