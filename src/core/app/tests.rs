use std::sync::Arc;

use tokio::sync::mpsc;

use super::*;
use crate::core::actions::{DeveloperAction, ToolRequest};
use crate::core::collaborator::{Collaborator, GenerationResponse, InlineImage, Modality};
use crate::core::identity::UserIdentity;
use crate::core::message::{Citation, Speaker, TurnStatus};
use crate::core::persistence::storage_key;
use crate::utils::test_utils::{create_test_app, FakeCollaborator, TEST_USER};

fn explain(input: &str) -> AppAction {
    AppAction::SubmitLabeled {
        tool: Tool::Developer,
        label: "Explain Code".to_string(),
        input: input.to_string(),
        image: None,
    }
}

fn chat(message: &str) -> AppAction {
    AppAction::Submit {
        request: ToolRequest::Chat {
            message: message.to_string(),
        },
    }
}

fn contents(app: &App, id: &ConversationId) -> Vec<String> {
    app.store
        .get(id)
        .expect("conversation")
        .turns
        .iter()
        .map(|turn| turn.content.clone())
        .collect()
}

#[tokio::test]
async fn explain_code_on_empty_store_creates_titled_conversation() {
    let (mut app, backend) = create_test_app();
    let collaborator = FakeCollaborator::new()
        .with_text("It prints the numbers 0 through 9.")
        .with_text("Python Loop Basics");

    run_to_completion(
        &mut app,
        &collaborator,
        [explain("for i in range(10): print(i)")],
    )
    .await;

    assert_eq!(app.store.len(), 1);
    let conversation = app.store.active_conversation().expect("selected");
    assert_eq!(conversation.title, "Python Loop Basics");
    assert_eq!(conversation.turns.len(), 2);
    assert_eq!(conversation.turns[0].speaker, Speaker::User);
    assert_eq!(
        conversation.turns[0].content,
        "Explain Code:\n```\nfor i in range(10): print(i)\n```"
    );
    assert_eq!(conversation.turns[1].speaker, Speaker::Model);
    assert_eq!(
        conversation.turns[1].content,
        "It prints the numbers 0 through 9."
    );
    assert_eq!(app.ui.in_flight, 0);

    let requests = collaborator.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].model, "gemini-2.5-pro");
    assert!(requests[0]
        .prompt_text()
        .starts_with("Explain the following code snippet:"));
    assert_eq!(requests[1].stop_sequences, vec!["\n".to_string()]);
    assert!(requests[1]
        .prompt_text()
        .contains("\"Explain Code:\n```\nfor i in range(10): print(i)\n```\""));

    assert!(backend
        .slot(&storage_key(TEST_USER))
        .expect("persisted")
        .contains("Python Loop Basics"));
}

#[tokio::test]
async fn failed_request_records_error_and_keeps_provisional_title() {
    let (mut app, _) = create_test_app();
    let collaborator = FakeCollaborator::new().with_error("rate limited");

    run_to_completion(&mut app, &collaborator, [chat("hello there")]).await;

    let conversation = app.store.active_conversation().expect("selected");
    assert_eq!(conversation.title, "hello there...");
    let last = conversation.last_turn().expect("turn");
    assert_eq!(last.content, "Error: rate limited");
    assert_eq!(last.status, TurnStatus::Failed);
    // No title request after a failure.
    assert_eq!(collaborator.requests().len(), 1);
}

#[tokio::test]
async fn title_failure_keeps_provisional_title() {
    let (mut app, _) = create_test_app();
    let collaborator = FakeCollaborator::new()
        .with_text("answer")
        .with_error("quota exceeded");

    run_to_completion(&mut app, &collaborator, [chat("what is borrowing")]).await;

    let conversation = app.store.active_conversation().expect("selected");
    assert_eq!(conversation.title, "what is borrowing...");
    assert_eq!(conversation.last_turn().expect("turn").content, "answer");
}

#[tokio::test]
async fn follow_up_reuses_active_conversation_without_retitling() {
    let (mut app, _) = create_test_app();
    let collaborator = FakeCollaborator::new()
        .with_text("first answer")
        .with_text("Short Title")
        .with_text("second answer");

    run_to_completion(&mut app, &collaborator, [chat("first")]).await;
    run_to_completion(&mut app, &collaborator, [chat("second")]).await;

    assert_eq!(app.store.len(), 1);
    let id = app.store.active().cloned().expect("selected");
    assert_eq!(
        contents(&app, &id),
        vec!["first", "first answer", "second", "second answer"]
    );
    assert_eq!(app.store.get(&id).expect("conversation").title, "Short Title");
    assert_eq!(collaborator.requests().len(), 3);
}

#[tokio::test]
async fn unsupported_label_changes_nothing() {
    let (mut app, _) = create_test_app();
    let collaborator = FakeCollaborator::new();

    run_to_completion(
        &mut app,
        &collaborator,
        [AppAction::SubmitLabeled {
            tool: Tool::Developer,
            label: "Summarize Text".to_string(),
            input: "text".to_string(),
            image: None,
        }],
    )
    .await;

    assert!(app.store.is_empty());
    assert!(collaborator.requests().is_empty());
    assert_eq!(
        app.ui.take_status().as_deref(),
        Some("Unsupported developer action: Summarize Text")
    );
}

#[test]
fn submit_is_optimistic() {
    let (mut app, _) = create_test_app();

    let command = apply_action(&mut app, chat("pending please")).expect("command issued");

    let conversation = app.store.active_conversation().expect("created and selected");
    assert_eq!(conversation.turns.len(), 2);
    assert!(conversation.turns[1].is_pending());
    assert_eq!(app.ui.in_flight, 1);
    match command {
        AppCommand::Generate(task) => {
            assert_eq!(task.conversation_id, conversation.id);
            assert_eq!(task.title_seed.as_deref(), Some("pending please"));
        }
        AppCommand::GenerateTitle(_) => panic!("expected a generation command"),
    }
}

#[tokio::test]
async fn concurrent_requests_resolve_their_own_placeholders() {
    let (mut app, _) = create_test_app();
    let first = apply_action(&mut app, chat("one")).expect("first command");
    let second = apply_action(&mut app, chat("two")).expect("second command");
    let id = app.store.active().cloned().expect("selected");

    // The second call finishes first.
    let fast = FakeCollaborator::new().with_text("answer two");
    let slow = FakeCollaborator::new().with_text("answer one");
    let resolved_second = run_command(&fast, second).await;
    assert!(apply_action(&mut app, resolved_second).is_none());
    let resolved_first = run_command(&slow, first).await;
    let title = apply_action(&mut app, resolved_first);

    assert!(matches!(title, Some(AppCommand::GenerateTitle(_))));
    assert_eq!(
        contents(&app, &id),
        vec!["one", "answer one", "two", "answer two"]
    );
    assert_eq!(app.ui.in_flight, 0);
}

#[tokio::test]
async fn response_for_deleted_conversation_is_dropped() {
    let (mut app, backend) = create_test_app();
    let command = apply_action(&mut app, chat("soon gone")).expect("command");
    let id = app.store.active().cloned().expect("selected");

    app.delete_conversation(&id).expect("delete");
    let collaborator = FakeCollaborator::new().with_text("too late");
    let action = run_command(&collaborator, command).await;

    assert!(apply_action(&mut app, action).is_none());
    assert!(app.store.is_empty());
    assert_eq!(app.store.active(), None);
    assert_eq!(backend.slot(&storage_key(TEST_USER)), None);
}

#[tokio::test]
async fn research_replies_keep_citations() {
    let (mut app, _) = create_test_app();
    let collaborator = FakeCollaborator::new().with_response(GenerationResponse {
        text: "Here are sources.".to_string(),
        citations: vec![Citation::new("https://example.org/paper", "Paper")],
        images: Vec::new(),
    });

    run_to_completion(
        &mut app,
        &collaborator,
        [AppAction::SubmitLabeled {
            tool: Tool::Researcher,
            label: "find-sources".to_string(),
            input: "coral reefs".to_string(),
            image: None,
        }],
    )
    .await;

    let last = app
        .store
        .active_conversation()
        .and_then(|c| c.last_turn())
        .expect("turn");
    assert_eq!(last.citations.len(), 1);
    assert!(collaborator.requests()[0].grounded_search);
}

#[tokio::test]
async fn image_edit_reply_embeds_returned_image() {
    let (mut app, _) = create_test_app();
    let collaborator = FakeCollaborator::new().with_response(GenerationResponse {
        images: vec![InlineImage::new("image/png", "RURJVA==")],
        ..GenerationResponse::default()
    });

    run_to_completion(
        &mut app,
        &collaborator,
        [AppAction::SubmitLabeled {
            tool: Tool::Image,
            label: "Edit Image".to_string(),
            input: "add a hat".to_string(),
            image: Some(InlineImage::new("image/jpeg", "SU1H")),
        }],
    )
    .await;

    let conversation = app.store.active_conversation().expect("selected");
    assert_eq!(conversation.turns[0].content, "Edit Image: add a hat");
    assert_eq!(
        conversation.turns[1].content,
        "Here is the edited image:\n\n![Edited image](data:image/png;base64,RURJVA==)"
    );
    assert_eq!(
        collaborator.requests()[0].response_modalities,
        vec![Modality::Image]
    );
}

#[test]
fn new_conversation_shortcut_clears_selection() {
    let (mut app, _) = create_test_app();
    apply_action(&mut app, chat("existing"));
    assert!(app.store.active().is_some());

    app.handle_shortcut(Shortcut::NewConversation);
    assert_eq!(app.store.active(), None);

    // The next submission starts a second conversation.
    apply_action(&mut app, chat("fresh"));
    assert_eq!(app.store.len(), 2);
}

#[test]
fn router_switches_tool_and_closes() {
    let (mut app, _) = create_test_app();
    app.handle_shortcut(Shortcut::ToggleRouter);
    assert!(app.ui.is_router_open());

    app.ui
        .router
        .as_mut()
        .expect("router open")
        .set_query("image");
    assert!(app.activate_router());
    assert_eq!(app.ui.active_tool, Tool::Image);
    assert!(!app.ui.is_router_open());
}

#[test]
fn router_with_no_results_stays_open() {
    let (mut app, _) = create_test_app();
    app.open_router();
    app.ui
        .router
        .as_mut()
        .expect("router open")
        .set_query("nothing matches this");
    assert!(!app.activate_router());
    assert!(app.ui.is_router_open());
}

#[test]
fn router_opens_conversations() {
    let (mut app, _) = create_test_app();
    apply_action(&mut app, chat("older"));
    app.start_new_conversation();
    apply_action(&mut app, chat("newer"));
    let older = app.store.list()[1].id.clone();

    app.open_router();
    app.ui
        .router
        .as_mut()
        .expect("router open")
        .set_query("older");
    assert!(app.activate_router());
    assert_eq!(app.store.active(), Some(&older));
}

#[test]
fn identity_changes_reload_or_clear_history() {
    let (mut app, _) = create_test_app();
    apply_action(&mut app, chat("mine"));
    app.open_router();

    app.apply_identity(None);
    assert!(app.store.is_empty());
    assert!(!app.ui.is_router_open());

    app.apply_identity(Some(&UserIdentity::new(TEST_USER)));
    assert_eq!(app.store.len(), 1);
    assert!(app.store.active().is_some());
}

#[tokio::test]
async fn spawned_commands_report_back_through_dispatcher() {
    let (mut app, _) = create_test_app();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let dispatcher = AppActionDispatcher::new(tx);
    let collaborator: Arc<dyn Collaborator> = Arc::new(
        FakeCollaborator::new()
            .with_text("```rust\nfn main() {}\n```")
            .with_text("Hello World"),
    );

    let command = apply_action(
        &mut app,
        AppAction::Submit {
            request: ToolRequest::Developer {
                action: DeveloperAction::GenerateCode,
                input: "hello world in rust".to_string(),
            },
        },
    )
    .expect("command");
    spawn_command(collaborator.clone(), dispatcher.clone(), command);

    let resolved = rx.recv().await.expect("resolution");
    let title = apply_action(&mut app, resolved).expect("title command");
    spawn_command(collaborator, dispatcher, title);
    let titled = rx.recv().await.expect("title");
    assert!(apply_action(&mut app, titled).is_none());

    let conversation = app.store.active_conversation().expect("selected");
    assert_eq!(conversation.title, "Hello World");
    assert!(!conversation.has_pending());
}
