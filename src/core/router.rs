//! The command router: a filterable list of global actions and
//! conversation jumps.

use crate::core::actions::Tool;
use crate::core::conversation::{Conversation, ConversationId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterAction {
    NewConversation,
    SwitchTool(Tool),
    OpenConversation(ConversationId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterEntry {
    pub id: String,
    pub label: String,
    pub action: RouterAction,
}

impl RouterEntry {
    fn matches(&self, needle: &str) -> bool {
        needle.is_empty() || self.label.to_lowercase().contains(needle)
    }
}

/// The fixed entries followed by one jump per conversation, in list order.
pub fn build_entries(conversations: &[Conversation]) -> Vec<RouterEntry> {
    let mut entries = vec![RouterEntry {
        id: "new-chat".to_string(),
        label: "New Chat".to_string(),
        action: RouterAction::NewConversation,
    }];
    entries.extend(Tool::ALL.iter().map(|tool| RouterEntry {
        id: format!("switch-{}", tool.label().to_lowercase()),
        label: format!("Switch to {} Tools", tool.label()),
        action: RouterAction::SwitchTool(*tool),
    }));
    entries.extend(conversations.iter().map(|conversation| RouterEntry {
        id: format!("chat-{}", conversation.id),
        label: format!("Go to chat: \"{}\"", conversation.title),
        action: RouterAction::OpenConversation(conversation.id.clone()),
    }));
    entries
}

#[derive(Debug, Clone, Default)]
pub struct CommandRouter {
    entries: Vec<RouterEntry>,
    query: String,
    /// Indices into `entries` that match the current query.
    visible: Vec<usize>,
    selected: usize,
}

impl CommandRouter {
    pub fn new(entries: Vec<RouterEntry>) -> Self {
        let mut router = Self {
            entries,
            ..Self::default()
        };
        router.refilter();
        router
    }

    pub fn for_conversations(conversations: &[Conversation]) -> Self {
        Self::new(build_entries(conversations))
    }

    /// Swap in a fresh entry list, keeping the query. The cursor returns to
    /// the top.
    pub fn refresh_entries(&mut self, conversations: &[Conversation]) {
        self.entries = build_entries(conversations);
        self.refilter();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.refilter();
    }

    pub fn backspace(&mut self) {
        if self.query.pop().is_some() {
            self.refilter();
        }
    }

    pub fn results(&self) -> impl Iterator<Item = &RouterEntry> + '_ {
        self.visible.iter().map(|&index| &self.entries[index])
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn selected_index(&self) -> Option<usize> {
        (!self.visible.is_empty()).then_some(self.selected)
    }

    pub fn selected(&self) -> Option<&RouterEntry> {
        self.visible
            .get(self.selected)
            .map(|&index| &self.entries[index])
    }

    pub fn move_up(&mut self) {
        if !self.visible.is_empty() {
            if self.selected == 0 {
                self.selected = self.visible.len() - 1;
            } else {
                self.selected -= 1;
            }
        }
    }

    pub fn move_down(&mut self) {
        if !self.visible.is_empty() {
            self.selected = (self.selected + 1) % self.visible.len();
        }
    }

    /// The highlighted entry's action, or `None` when nothing matches.
    pub fn activate(&self) -> Option<RouterAction> {
        self.selected().map(|entry| entry.action.clone())
    }

    fn refilter(&mut self) {
        let needle = self.query.to_lowercase();
        self.visible = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.matches(&needle))
            .map(|(index, _)| index)
            .collect();
        self.selected = 0;
    }
}
