use tracing::debug;

use crate::core::actions::Tool;
use crate::core::config::data::ModelConfig;
use crate::core::conversation::ConversationId;
use crate::core::identity::UserIdentity;
use crate::core::router::{CommandRouter, RouterAction};
use crate::core::shortcuts::Shortcut;
use crate::core::store::{ConversationStore, StoreError};

pub mod actions;
pub mod executors;
pub mod ui_state;

pub use actions::{
    apply_action, apply_actions, AppAction, AppActionDispatcher, AppCommand, GenerationTask,
    TitleTask,
};
pub use executors::{run_command, run_to_completion, spawn_command};
pub use ui_state::UiState;

/// Everything the event loop owns. Only the loop mutates it, one action at a
/// time.
pub struct App {
    pub store: ConversationStore,
    pub models: ModelConfig,
    pub ui: UiState,
}

impl App {
    pub fn new(store: ConversationStore, models: ModelConfig, tool: Tool) -> Self {
        Self {
            store,
            models,
            ui: UiState::new(tool),
        }
    }

    /// Follow an identity change: load the user's history, or clear
    /// everything on sign-out.
    pub fn apply_identity(&mut self, user: Option<&UserIdentity>) {
        self.ui.router = None;
        match user {
            Some(user) => {
                debug!(user = %user.id, "attaching conversation history");
                self.store.attach_user(&user.id);
            }
            None => self.store.detach_user(),
        }
    }

    /// Deselect so the next submission opens a new conversation.
    pub fn start_new_conversation(&mut self) {
        self.store.clear_selection();
    }

    pub fn select_conversation(&mut self, id: &ConversationId) -> Result<(), StoreError> {
        self.store.select(id)
    }

    pub fn delete_conversation(&mut self, id: &ConversationId) -> Result<(), StoreError> {
        self.store.delete_conversation(id)?;
        if let Some(router) = self.ui.router.as_mut() {
            router.refresh_entries(self.store.list());
        }
        Ok(())
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.ui.active_tool = tool;
    }

    pub fn open_router(&mut self) {
        self.ui.router = Some(CommandRouter::for_conversations(self.store.list()));
    }

    pub fn close_router(&mut self) {
        self.ui.router = None;
    }

    pub fn toggle_router(&mut self) {
        if self.ui.is_router_open() {
            self.close_router();
        } else {
            self.open_router();
        }
    }

    /// Run the highlighted router entry and close the router. Returns false
    /// when the router is closed or has nothing to activate; it then stays as
    /// it was.
    pub fn activate_router(&mut self) -> bool {
        let Some(action) = self.ui.router.as_ref().and_then(CommandRouter::activate) else {
            return false;
        };
        self.close_router();
        self.run_router_action(action);
        true
    }

    pub fn run_router_action(&mut self, action: RouterAction) {
        match action {
            RouterAction::NewConversation => self.start_new_conversation(),
            RouterAction::SwitchTool(tool) => self.set_tool(tool),
            RouterAction::OpenConversation(id) => {
                if let Err(err) = self.select_conversation(&id) {
                    debug!(%err, "router target vanished");
                }
            }
        }
    }

    pub fn handle_shortcut(&mut self, shortcut: Shortcut) {
        match shortcut {
            Shortcut::ToggleRouter => self.toggle_router(),
            Shortcut::NewConversation => self.start_new_conversation(),
        }
    }
}

#[cfg(test)]
mod tests;
