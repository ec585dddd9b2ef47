use crate::core::actions::Tool;
use crate::core::router::CommandRouter;

/// Shell-facing state that is not part of any conversation.
#[derive(Debug, Clone)]
pub struct UiState {
    pub active_tool: Tool,
    /// The command router, when open.
    pub router: Option<CommandRouter>,
    /// One-line message for the user, consumed by the renderer.
    pub status: Option<String>,
    /// Collaborator calls issued and not yet resolved.
    pub in_flight: usize,
}

impl UiState {
    pub fn new(active_tool: Tool) -> Self {
        Self {
            active_tool,
            router: None,
            status: None,
            in_flight: 0,
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn take_status(&mut self) -> Option<String> {
        self.status.take()
    }

    pub fn is_router_open(&self) -> bool {
        self.router.is_some()
    }
}
