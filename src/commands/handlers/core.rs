use crate::commands::registry::CommandInvocation;
use crate::commands::{all_commands, router_view, CommandContext, CommandResult};

const HELP_FOOTER: &str =
    "Plain lines are sent as chat messages. Ctrl+K then Enter toggles the router.";

pub(crate) fn handle_help(
    _ctx: &mut CommandContext<'_>,
    _inv: CommandInvocation<'_>,
) -> CommandResult {
    let mut help = String::from("Commands:");
    for command in all_commands() {
        help.push_str(&format!("\n  {:<44} {}", command.usage, command.help));
    }
    help.push_str("\n\n");
    help.push_str(HELP_FOOTER);
    CommandResult::Output(help)
}

pub(crate) fn handle_palette(
    ctx: &mut CommandContext<'_>,
    inv: CommandInvocation<'_>,
) -> CommandResult {
    ctx.app.open_router();
    if let Some(router) = ctx.app.ui.router.as_mut() {
        router.set_query(inv.args);
    }
    router_view(ctx.app)
}

pub(crate) fn handle_quit(
    _ctx: &mut CommandContext<'_>,
    _inv: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Quit
}
