//! Runs [`AppCommand`]s against the collaborator and turns the outcome back
//! into an [`AppAction`].

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::info;

use super::actions::{apply_action, AppAction, AppActionDispatcher, AppCommand};
use super::App;
use crate::core::collaborator::Collaborator;
use crate::core::title::finalize_title;

/// Perform one command. Never fails: errors become a failed outcome or the
/// provisional title.
pub async fn run_command(collaborator: &dyn Collaborator, command: AppCommand) -> AppAction {
    match command {
        AppCommand::Generate(task) => {
            let outcome = match collaborator.generate(task.generation).await {
                Ok(response) => Ok(task.request.shape_reply(response)),
                Err(err) => {
                    info!(
                        conversation = %task.conversation_id,
                        %err,
                        "collaborator request failed"
                    );
                    Err(err.message)
                }
            };
            AppAction::TurnResolved {
                conversation_id: task.conversation_id,
                ticket: task.ticket,
                outcome,
                title_seed: task.title_seed,
            }
        }
        AppCommand::GenerateTitle(task) => {
            let result = collaborator.generate(task.request).await;
            AppAction::TitleGenerated {
                conversation_id: task.conversation_id,
                title: finalize_title(result, &task.first_message),
            }
        }
    }
}

/// Run the command on its own task and post the result back to the loop.
pub fn spawn_command(
    collaborator: Arc<dyn Collaborator>,
    dispatcher: AppActionDispatcher,
    command: AppCommand,
) {
    tokio::spawn(async move {
        let action = run_command(collaborator.as_ref(), command).await;
        dispatcher.dispatch(action);
    });
}

/// Apply actions and await every command they produce, including follow-ups,
/// before returning.
pub async fn run_to_completion(
    app: &mut App,
    collaborator: &dyn Collaborator,
    actions: impl IntoIterator<Item = AppAction>,
) {
    let mut queue: VecDeque<AppAction> = actions.into_iter().collect();
    while let Some(action) = queue.pop_front() {
        if let Some(command) = apply_action(app, action) {
            queue.push_back(run_command(collaborator, command).await);
        }
    }
}
