//! In-memory conversation list backed by a durable per-user slot.
//!
//! Every effective mutation saves the full list; an empty list removes the
//! slot instead. Operations that target a conversation which no longer exists
//! return [`StoreError::NotFound`] so callers can drop the result; nothing is
//! recreated.

use std::error::Error as StdError;
use std::fmt;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::core::conversation::{Conversation, ConversationId, IdAllocator};
use crate::core::message::{PendingTicket, Turn, TurnOutcome};
use crate::core::persistence::{decode_history, encode_history, storage_key, DurableStore};
use crate::core::title::provisional_title;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound(ConversationId),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "Conversation {id} not found"),
        }
    }
}

impl StdError for StoreError {}

/// Change notifications for observers of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Loaded,
    Cleared,
    Created(ConversationId),
    TurnsAppended(ConversationId),
    PlaceholderResolved(ConversationId),
    Renamed(ConversationId),
    Deleted(ConversationId),
    SelectionChanged(Option<ConversationId>),
}

pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active: Option<ConversationId>,
    backend: Box<dyn DurableStore>,
    storage_key: Option<String>,
    ids: IdAllocator,
    next_ticket: u64,
    events: broadcast::Sender<StoreEvent>,
}

impl ConversationStore {
    /// A detached store. Nothing is loaded or saved until
    /// [`attach_user`](Self::attach_user) is called.
    pub fn new(backend: Box<dyn DurableStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            conversations: Vec::new(),
            active: None,
            backend,
            storage_key: None,
            ids: IdAllocator::default(),
            next_ticket: 0,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Replace the in-memory state with `user_id`'s stored history and select
    /// its first conversation. Unreadable history is treated as empty.
    pub fn attach_user(&mut self, user_id: &str) {
        let key = storage_key(user_id);
        let conversations = match self.backend.get(&key) {
            Ok(Some(blob)) => match decode_history(&key, &blob) {
                Ok(conversations) => conversations,
                Err(err) => {
                    info!(%err, "discarding unreadable conversation history");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%err, "failed to read conversation history");
                Vec::new()
            }
        };

        for conversation in &conversations {
            self.ids.observe(&conversation.id);
        }
        debug!(user = user_id, count = conversations.len(), "loaded history");

        self.active = conversations.first().map(|c| c.id.clone());
        self.conversations = conversations;
        self.storage_key = Some(key);
        self.emit(StoreEvent::Loaded);
    }

    /// Forget the in-memory state without touching the durable slot.
    pub fn detach_user(&mut self) {
        self.storage_key = None;
        self.conversations.clear();
        self.active = None;
        self.emit(StoreEvent::Cleared);
    }

    pub fn storage_key(&self) -> Option<&str> {
        self.storage_key.as_deref()
    }

    pub fn list(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn get(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| &c.id == id)
    }

    pub fn active(&self) -> Option<&ConversationId> {
        self.active.as_ref()
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active.as_ref().and_then(|id| self.get(id))
    }

    pub fn select(&mut self, id: &ConversationId) -> Result<(), StoreError> {
        if self.position(id).is_none() {
            return Err(StoreError::NotFound(id.clone()));
        }
        self.set_active(Some(id.clone()));
        Ok(())
    }

    /// Deselect so the next submission starts a new conversation.
    pub fn clear_selection(&mut self) {
        self.set_active(None);
    }

    pub fn create_conversation(&mut self, first_user_text: &str) -> ConversationId {
        let id = self.ids.next();
        let conversation = Conversation::new(id.clone(), provisional_title(first_user_text));
        self.conversations.insert(0, conversation);
        self.persist();
        self.emit(StoreEvent::Created(id.clone()));
        id
    }

    /// Push a user turn and the pending model turn that answers it as one
    /// mutation. Returns the ticket that owns the placeholder.
    pub fn append_user_and_placeholder(
        &mut self,
        id: &ConversationId,
        user_text: &str,
    ) -> Result<PendingTicket, StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        self.next_ticket += 1;
        let ticket = PendingTicket(self.next_ticket);
        let turns = &mut self.conversations[index].turns;
        turns.push(Turn::user(user_text));
        turns.push(Turn::pending(ticket));

        self.persist();
        self.emit(StoreEvent::TurnsAppended(id.clone()));
        Ok(ticket)
    }

    pub fn resolve_placeholder(
        &mut self,
        id: &ConversationId,
        ticket: PendingTicket,
        outcome: TurnOutcome,
    ) -> Result<(), StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let conversation = &mut self.conversations[index];

        let Some(turn_index) = conversation.placeholder_index(ticket) else {
            debug!(conversation = %id, "no pending turn left to resolve");
            return Ok(());
        };
        conversation.turns[turn_index].settle(outcome);

        self.persist();
        self.emit(StoreEvent::PlaceholderResolved(id.clone()));
        Ok(())
    }

    pub fn rename_conversation(
        &mut self,
        id: &ConversationId,
        title: impl Into<String>,
    ) -> Result<(), StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        self.conversations[index].title = title.into();
        self.persist();
        self.emit(StoreEvent::Renamed(id.clone()));
        Ok(())
    }

    /// Remove a conversation. Deleting the active one selects the new head,
    /// or nothing when the list is now empty.
    pub fn delete_conversation(&mut self, id: &ConversationId) -> Result<(), StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        self.conversations.remove(index);
        self.persist();
        self.emit(StoreEvent::Deleted(id.clone()));

        if self.active.as_ref() == Some(id) {
            let next = self.conversations.first().map(|c| c.id.clone());
            self.set_active(next);
        }
        Ok(())
    }

    fn position(&self, id: &ConversationId) -> Option<usize> {
        self.conversations.iter().position(|c| &c.id == id)
    }

    fn set_active(&mut self, id: Option<ConversationId>) {
        if self.active != id {
            self.active = id.clone();
            self.emit(StoreEvent::SelectionChanged(id));
        }
    }

    fn persist(&mut self) {
        let Some(key) = self.storage_key.as_deref() else {
            return;
        };
        let result = if self.conversations.is_empty() {
            self.backend.remove(key)
        } else {
            encode_history(&self.conversations).and_then(|blob| self.backend.set(key, &blob))
        };
        if let Err(err) = result {
            warn!(%err, "failed to save conversation history");
        }
    }

    fn emit(&self, event: StoreEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }
}
