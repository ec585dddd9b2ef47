use tracing::debug;

use super::{AppCommand, GenerationTask, TitleTask};
use crate::core::actions::ToolRequest;
use crate::core::app::App;
use crate::core::conversation::ConversationId;
use crate::core::message::{PendingTicket, TurnOutcome};
use crate::core::title::title_request;

/// Optimistically record the exchange, then hand the collaborator call to
/// the executor. With no active conversation a new one is created and
/// selected first.
pub(super) fn submit(app: &mut App, request: ToolRequest) -> Option<AppCommand> {
    let user_content = request.user_content();

    let (conversation_id, created) = match app.store.active().cloned() {
        Some(id) => (id, false),
        None => {
            let id = app.store.create_conversation(&user_content);
            app.store.select(&id).ok()?;
            (id, true)
        }
    };

    let ticket = app
        .store
        .append_user_and_placeholder(&conversation_id, &user_content)
        .ok()?;
    app.ui.in_flight += 1;

    debug!(conversation = %conversation_id, ?ticket, "issuing collaborator request");
    Some(AppCommand::Generate(GenerationTask {
        conversation_id,
        ticket,
        generation: request.build_request(&app.models),
        request,
        title_seed: created.then_some(user_content),
    }))
}

/// Settle the placeholder. A successful first exchange asks for a title.
pub(super) fn resolve(
    app: &mut App,
    conversation_id: ConversationId,
    ticket: PendingTicket,
    outcome: TurnOutcome,
    title_seed: Option<String>,
) -> Option<AppCommand> {
    app.ui.in_flight = app.ui.in_flight.saturating_sub(1);
    let succeeded = outcome.is_ok();

    if let Err(err) = app
        .store
        .resolve_placeholder(&conversation_id, ticket, outcome)
    {
        debug!(%err, "dropping late response");
        return None;
    }

    let first_message = title_seed.filter(|_| succeeded)?;
    Some(AppCommand::GenerateTitle(TitleTask {
        request: title_request(&first_message, &app.models),
        conversation_id,
        first_message,
    }))
}

pub(super) fn rename(app: &mut App, conversation_id: &ConversationId, title: String) {
    if let Err(err) = app.store.rename_conversation(conversation_id, title) {
        debug!(%err, "dropping generated title");
    }
}
