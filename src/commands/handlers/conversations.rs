use crate::commands::registry::CommandInvocation;
use crate::commands::{describe_selection, resolve_conversation, CommandContext, CommandResult};
use crate::ui::renderer::render_conversation_list;

pub(crate) fn handle_new(
    ctx: &mut CommandContext<'_>,
    _inv: CommandInvocation<'_>,
) -> CommandResult {
    ctx.app.start_new_conversation();
    CommandResult::Output("New chat. Your next message starts it.".to_string())
}

pub(crate) fn handle_list(
    ctx: &mut CommandContext<'_>,
    _inv: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Output(render_conversation_list(
        ctx.app.store.list(),
        ctx.app.store.active(),
    ))
}

pub(crate) fn handle_open(
    ctx: &mut CommandContext<'_>,
    inv: CommandInvocation<'_>,
) -> CommandResult {
    let Some(id) = resolve_conversation(ctx.app.store.list(), inv.args) else {
        return CommandResult::Output(format!("No conversation matches '{}'.", inv.args));
    };
    match ctx.app.select_conversation(&id) {
        Ok(()) => CommandResult::Output(describe_selection(ctx.app)),
        Err(err) => CommandResult::Output(err.to_string()),
    }
}

pub(crate) fn handle_delete(
    ctx: &mut CommandContext<'_>,
    inv: CommandInvocation<'_>,
) -> CommandResult {
    let target = if inv.args.is_empty() {
        ctx.app.store.active().cloned()
    } else {
        resolve_conversation(ctx.app.store.list(), inv.args)
    };
    let Some(id) = target else {
        return CommandResult::Output("Nothing to delete.".to_string());
    };
    let title = ctx
        .app
        .store
        .get(&id)
        .map(|conversation| conversation.title.clone())
        .unwrap_or_default();
    match ctx.app.delete_conversation(&id) {
        Ok(()) => CommandResult::Output(format!("Deleted \"{title}\".")),
        Err(err) => CommandResult::Output(err.to_string()),
    }
}

pub(crate) fn handle_rename(
    ctx: &mut CommandContext<'_>,
    inv: CommandInvocation<'_>,
) -> CommandResult {
    if inv.args.is_empty() {
        return CommandResult::Output("Usage: /rename <title>".to_string());
    }
    let Some(id) = ctx.app.store.active().cloned() else {
        return CommandResult::Output("No conversation is selected.".to_string());
    };
    match ctx.app.store.rename_conversation(&id, inv.args) {
        Ok(()) => CommandResult::Output(format!("Renamed to \"{}\".", inv.args)),
        Err(err) => CommandResult::Output(err.to_string()),
    }
}
