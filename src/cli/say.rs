//! Shell-less "say" command: run one tool action and print the reply.

use std::error::Error;
use std::path::PathBuf;

use crate::api::gemini::GeminiClient;
use crate::auth::AuthManager;
use crate::cli::history_backend;
use crate::core::actions::Tool;
use crate::core::app::{run_to_completion, App, AppAction};
use crate::core::collaborator::{Collaborator, InlineImage};
use crate::core::config::Config;
use crate::core::identity::UserIdentity;
use crate::core::message::TurnStatus;
use crate::core::persistence::MemoryStore;
use crate::core::store::ConversationStore;
use crate::ui::renderer::{elide_data_urls, render_turn};
use crate::utils::image::load_inline_image;

pub async fn run_say(
    config: &Config,
    user: Option<UserIdentity>,
    tool: Tool,
    action: String,
    input: String,
    image: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let image = match image {
        Some(path) => match load_inline_image(&path) {
            Ok(image) => Some(image),
            Err(err) => {
                eprintln!("❌ {err}");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let api_key = match AuthManager::new().resolve_api_key() {
        Ok(key) => key,
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    };
    let client = GeminiClient::new(api_key, config.api_base_url());

    // With a user the exchange is saved to their history; without one it
    // lives only for this run.
    let store = match &user {
        Some(user) => {
            let mut store = ConversationStore::new(history_backend(config));
            store.attach_user(&user.id);
            store
        }
        None => ConversationStore::new(Box::new(MemoryStore::new())),
    };
    let mut app = App::new(store, config.models.clone(), tool);

    match say(&mut app, &client, tool, action, input, image).await {
        Ok(reply) => {
            println!("{reply}");
            Ok(())
        }
        Err(message) => {
            eprintln!("❌ {message}");
            std::process::exit(1);
        }
    }
}

/// Submit one labeled action into a fresh conversation and wait for the
/// reply, including the title request that follows it.
pub async fn say(
    app: &mut App,
    collaborator: &dyn Collaborator,
    tool: Tool,
    label: String,
    input: String,
    image: Option<InlineImage>,
) -> Result<String, String> {
    app.start_new_conversation();
    run_to_completion(
        app,
        collaborator,
        [AppAction::SubmitLabeled {
            tool,
            label,
            input,
            image,
        }],
    )
    .await;

    if let Some(status) = app.ui.take_status() {
        return Err(status);
    }
    let turn = app
        .store
        .active_conversation()
        .and_then(|conversation| conversation.last_turn())
        .ok_or_else(|| "No reply was recorded".to_string())?;

    match turn.status {
        TurnStatus::Failed => Err(turn.content.clone()),
        _ if turn.citations.is_empty() => Ok(elide_data_urls(&turn.content)),
        _ => Ok(render_turn(turn)
            .trim_start_matches("model> ")
            .to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collaborator::GenerationResponse;
    use crate::core::message::Citation;
    use crate::utils::test_utils::{create_test_app, FakeCollaborator};

    #[tokio::test]
    async fn prints_reply_and_titles_conversation() {
        let (mut app, _) = create_test_app();
        let collaborator = FakeCollaborator::new()
            .with_text("It binds x.")
            .with_text("Binding basics");

        let reply = say(
            &mut app,
            &collaborator,
            Tool::Developer,
            "explain-code".to_string(),
            "let x = 1;".to_string(),
            None,
        )
        .await
        .expect("reply");

        assert_eq!(reply, "It binds x.");
        assert_eq!(
            app.store.active_conversation().expect("active").title,
            "Binding basics"
        );
    }

    #[tokio::test]
    async fn unsupported_label_never_reaches_collaborator() {
        let (mut app, _) = create_test_app();
        let collaborator = FakeCollaborator::new();

        let err = say(
            &mut app,
            &collaborator,
            Tool::Researcher,
            "explain-code".to_string(),
            "text".to_string(),
            None,
        )
        .await
        .expect_err("unsupported");

        assert_eq!(err, "Unsupported researcher action: explain-code");
        assert!(collaborator.requests().is_empty());
    }

    #[tokio::test]
    async fn failures_and_citations_are_reported() {
        let (mut app, _) = create_test_app();
        let collaborator = FakeCollaborator::new()
            .with_error("Quota exceeded")
            .with_response(GenerationResponse {
                citations: vec![Citation::new("https://a.example", "A")],
                ..GenerationResponse::text("Found one.")
            })
            .with_text("Sources");

        let err = say(
            &mut app,
            &collaborator,
            Tool::Developer,
            "find-bugs".to_string(),
            "panic!()".to_string(),
            None,
        )
        .await
        .expect_err("failed");
        assert_eq!(err, "Error: Quota exceeded");
        let failed = app
            .store
            .active_conversation()
            .and_then(|conversation| conversation.last_turn())
            .expect("failed turn");
        assert_eq!(failed.status, TurnStatus::Failed);

        let reply = say(
            &mut app,
            &collaborator,
            Tool::Researcher,
            "find-sources".to_string(),
            "rust".to_string(),
            None,
        )
        .await
        .expect("reply");
        assert_eq!(reply, "Found one.\n    [1] A <https://a.example>");
    }
}
