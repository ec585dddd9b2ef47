use crate::commands::registry::CommandInvocation;
use crate::commands::{CommandContext, CommandResult};
use crate::core::identity::UserIdentity;

pub(crate) fn handle_login(
    ctx: &mut CommandContext<'_>,
    inv: CommandInvocation<'_>,
) -> CommandResult {
    if inv.args.is_empty() {
        return CommandResult::Output("Usage: /login <user>".to_string());
    }
    ctx.identity.sign_in(UserIdentity::new(inv.args));
    CommandResult::Output(format!("Signed in as {}.", inv.args))
}

pub(crate) fn handle_logout(
    ctx: &mut CommandContext<'_>,
    _inv: CommandInvocation<'_>,
) -> CommandResult {
    ctx.identity.sign_out();
    CommandResult::Output("Signed out.".to_string())
}

pub(crate) fn handle_whoami(
    ctx: &mut CommandContext<'_>,
    _inv: CommandInvocation<'_>,
) -> CommandResult {
    match ctx.identity.current_user() {
        Some(user) => CommandResult::Output(format!("Signed in as {}.", user.label())),
        None => CommandResult::Output("Not signed in.".to_string()),
    }
}
