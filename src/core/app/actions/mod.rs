mod dispatch;

use tokio::sync::mpsc;

use super::App;
use crate::core::actions::{Tool, ToolRequest};
use crate::core::collaborator::{GenerationRequest, InlineImage};
use crate::core::conversation::ConversationId;
use crate::core::message::{PendingTicket, TurnOutcome};

pub enum AppAction {
    /// Run a fully-formed tool request against the active conversation.
    Submit {
        request: ToolRequest,
    },
    /// Run a tool action named by its label, as typed by the user.
    SubmitLabeled {
        tool: Tool,
        label: String,
        input: String,
        image: Option<InlineImage>,
    },
    TurnResolved {
        conversation_id: ConversationId,
        ticket: PendingTicket,
        outcome: TurnOutcome,
        /// First user message of a conversation this request created.
        title_seed: Option<String>,
    },
    TitleGenerated {
        conversation_id: ConversationId,
        title: String,
    },
}

/// A collaborator call that will settle one placeholder turn.
#[derive(Debug, Clone)]
pub struct GenerationTask {
    pub conversation_id: ConversationId,
    pub ticket: PendingTicket,
    pub request: ToolRequest,
    pub generation: GenerationRequest,
    pub title_seed: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TitleTask {
    pub conversation_id: ConversationId,
    pub first_message: String,
    pub request: GenerationRequest,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Generate(GenerationTask),
    GenerateTitle(TitleTask),
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppAction>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppAction>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: AppAction) {
        // The loop has exited; nothing is left to update.
        let _ = self.tx.send(action);
    }
}

pub fn apply_actions(
    app: &mut App,
    actions: impl IntoIterator<Item = AppAction>,
) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for action in actions {
        if let Some(cmd) = apply_action(app, action) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::Submit { request } => dispatch::submit(app, request),
        AppAction::SubmitLabeled {
            tool,
            label,
            input,
            image,
        } => match ToolRequest::from_label(tool, &label, input, image) {
            Ok(request) => dispatch::submit(app, request),
            Err(err) => {
                app.ui.set_status(err.to_string());
                None
            }
        },
        AppAction::TurnResolved {
            conversation_id,
            ticket,
            outcome,
            title_seed,
        } => dispatch::resolve(app, conversation_id, ticket, outcome, title_seed),
        AppAction::TitleGenerated {
            conversation_id,
            title,
        } => {
            dispatch::rename(app, &conversation_id, title);
            None
        }
    }
}
