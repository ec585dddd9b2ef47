mod handlers;
mod registry;

pub use registry::{all_commands, find_command, Command, CommandInvocation};

use crate::core::actions::{Tool, ToolRequest};
use crate::core::app::{App, AppAction};
use crate::core::conversation::{Conversation, ConversationId};
use crate::core::identity::IdentityStore;
use crate::core::shortcuts::{key_from_control_char, resolve_shortcut, Focus};
use crate::ui::renderer::{render_router, render_transcript};

pub enum CommandResult {
    Continue,
    Dispatch(AppAction),
    Output(String),
    Quit,
}

pub struct CommandContext<'a> {
    pub app: &'a mut App,
    pub identity: &'a IdentityStore,
}

/// Interpret one line of shell input.
pub fn process_input(ctx: &mut CommandContext<'_>, input: &str) -> CommandResult {
    if let Some(result) = process_shortcut(ctx, input) {
        return result;
    }
    if ctx.app.ui.is_router_open() {
        return process_router_input(ctx.app, input);
    }

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return CommandResult::Continue;
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return submit(
            ctx,
            AppAction::Submit {
                request: ToolRequest::Chat {
                    message: trimmed.to_string(),
                },
            },
        );
    };

    let (command_name, args) = split_word(rest);
    match registry::find_command(command_name) {
        Some(command) => (command.handler)(
            ctx,
            CommandInvocation {
                input: trimmed,
                args,
            },
        ),
        None => CommandResult::Output(format!(
            "Unknown command: /{command_name}. Type /help for a list."
        )),
    }
}

/// A line made of a single control character is a keyboard shortcut.
fn process_shortcut(ctx: &mut CommandContext<'_>, input: &str) -> Option<CommandResult> {
    let mut chars = input.trim_end_matches(['\r', '\n']).chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    let press = key_from_control_char(c)?;
    match resolve_shortcut(press, Focus::TextInput) {
        Some(shortcut) => {
            ctx.app.handle_shortcut(shortcut);
            Some(router_view(ctx.app))
        }
        None => Some(CommandResult::Continue),
    }
}

fn router_view(app: &App) -> CommandResult {
    match app.ui.router.as_ref() {
        Some(router) => CommandResult::Output(render_router(router)),
        None => CommandResult::Output("Router closed.".to_string()),
    }
}

/// While the router is open: `:q` closes it, `:up`/`:down` move, an empty
/// line runs the highlighted entry and anything else becomes the query.
pub fn process_router_input(app: &mut App, input: &str) -> CommandResult {
    let line = input.trim_end_matches(['\r', '\n']);
    match line.trim() {
        ":q" => {
            app.close_router();
            return CommandResult::Output("Router closed.".to_string());
        }
        ":up" => {
            if let Some(router) = app.ui.router.as_mut() {
                router.move_up();
            }
        }
        ":down" => {
            if let Some(router) = app.ui.router.as_mut() {
                router.move_down();
            }
        }
        "" => {
            if app.activate_router() {
                return CommandResult::Output(describe_selection(app));
            }
        }
        _ => {
            if let Some(router) = app.ui.router.as_mut() {
                router.set_query(line.trim());
            }
        }
    }
    router_view(app)
}

fn describe_selection(app: &App) -> String {
    let tool = app.ui.active_tool.label();
    match app.store.active_conversation() {
        Some(conversation) => format!("{}\n\n(tool: {tool})", render_transcript(conversation)),
        None => format!("New chat. (tool: {tool})"),
    }
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

/// `n` (1-based position in the list) or a conversation id.
pub fn resolve_conversation(list: &[Conversation], reference: &str) -> Option<ConversationId> {
    if let Ok(position) = reference.parse::<usize>() {
        if (1..=list.len()).contains(&position) {
            return Some(list[position - 1].id.clone());
        }
    }
    list.iter()
        .find(|conversation| conversation.id.as_str() == reference)
        .map(|conversation| conversation.id.clone())
}

fn submit(ctx: &mut CommandContext<'_>, action: AppAction) -> CommandResult {
    if ctx.identity.current_user().is_none() {
        return CommandResult::Output("Sign in first with /login <user>.".to_string());
    }
    CommandResult::Dispatch(action)
}

fn submit_labeled(
    ctx: &mut CommandContext<'_>,
    tool: Tool,
    args: &str,
    usage: &str,
) -> CommandResult {
    let (label, input) = split_word(args);
    if label.is_empty() || input.is_empty() {
        return CommandResult::Output(format!("Usage: {usage}"));
    }
    submit(
        ctx,
        AppAction::SubmitLabeled {
            tool,
            label: label.to_string(),
            input: input.to_string(),
            image: None,
        },
    )
}
