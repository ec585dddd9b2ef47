//! The interactive line shell: one loop owns the [`App`] and multiplexes
//! user input, finished collaborator calls, identity changes and store
//! notifications.

use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

use crate::commands::{process_input, CommandContext, CommandResult};
use crate::core::app::{apply_actions, spawn_command, App, AppAction, AppActionDispatcher};
use crate::core::collaborator::Collaborator;
use crate::core::identity::IdentityStore;
use crate::core::store::StoreEvent;
use crate::ui::renderer::{prompt, render_turn};

fn show_prompt(app: &App) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", prompt(app))?;
    stdout.flush()
}

fn flush_status(app: &mut App) {
    if let Some(status) = app.ui.take_status() {
        println!("{status}");
    }
}

fn run_actions(
    app: &mut App,
    actions: impl IntoIterator<Item = AppAction>,
    collaborator: &Arc<dyn Collaborator>,
    dispatcher: &AppActionDispatcher,
) {
    for command in apply_actions(app, actions) {
        spawn_command(collaborator.clone(), dispatcher.clone(), command);
    }
    flush_status(app);
}

fn report_store_event(app: &App, event: StoreEvent) {
    match event {
        StoreEvent::PlaceholderResolved(id) => {
            let Some(conversation) = app.store.get(&id) else {
                return;
            };
            if app.store.active() == Some(&id) {
                if let Some(turn) = conversation.last_turn() {
                    println!("\n{}", render_turn(turn));
                }
            } else {
                println!("\nReply ready in \"{}\".", conversation.title);
            }
        }
        StoreEvent::Renamed(id) => {
            if let Some(conversation) = app.store.get(&id) {
                println!("\nTitle: {}", conversation.title);
            }
        }
        StoreEvent::Loaded => {
            println!("Loaded {} conversation(s).", app.store.len());
        }
        other => debug!(?other, "store event"),
    }
}

pub async fn run_shell(
    mut app: App,
    identity: IdentityStore,
    collaborator: Arc<dyn Collaborator>,
) -> Result<(), Box<dyn Error>> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppAction>();
    let dispatcher = AppActionDispatcher::new(action_tx);
    let mut identity_rx = identity.subscribe();
    let mut store_events = app.store.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let initial = identity_rx.borrow_and_update().clone();
    app.apply_identity(initial.as_ref());
    if initial.is_none() {
        println!("Not signed in. Use /login <user> to load your conversations.");
    }
    println!("Type /help for commands.");
    show_prompt(&app)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let result = {
                    let mut ctx = CommandContext { app: &mut app, identity: &identity };
                    process_input(&mut ctx, &line)
                };
                match result {
                    CommandResult::Continue => {}
                    CommandResult::Output(text) => println!("{text}"),
                    CommandResult::Dispatch(action) => {
                        run_actions(&mut app, [action], &collaborator, &dispatcher);
                    }
                    CommandResult::Quit => break,
                }
                show_prompt(&app)?;
            }
            Some(action) = action_rx.recv() => {
                run_actions(&mut app, [action], &collaborator, &dispatcher);
            }
            changed = identity_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let user = identity_rx.borrow_and_update().clone();
                app.apply_identity(user.as_ref());
                show_prompt(&app)?;
            }
            event = store_events.recv() => {
                match event {
                    Ok(event) => {
                        let is_reply = matches!(
                            event,
                            StoreEvent::PlaceholderResolved(_) | StoreEvent::Renamed(_)
                        );
                        report_store_event(&app, event);
                        if is_reply {
                            show_prompt(&app)?;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "store notifications lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    if app.ui.in_flight > 0 {
        debug!(in_flight = app.ui.in_flight, "leaving with replies outstanding");
    }
    Ok(())
}
