use std::path::Path;

use crate::commands::registry::CommandInvocation;
use crate::commands::{split_word, submit, submit_labeled, CommandContext, CommandResult};
use crate::core::actions::{Tool, ToolRequest};
use crate::core::app::AppAction;
use crate::utils::image::load_inline_image;

pub(crate) fn handle_tool(
    ctx: &mut CommandContext<'_>,
    inv: CommandInvocation<'_>,
) -> CommandResult {
    match inv.args.parse::<Tool>() {
        Ok(tool) => {
            ctx.app.set_tool(tool);
            CommandResult::Output(format!("Switched to {} tools.", tool.label()))
        }
        Err(err) => CommandResult::Output(err),
    }
}

pub(crate) fn handle_do(ctx: &mut CommandContext<'_>, inv: CommandInvocation<'_>) -> CommandResult {
    match ctx.app.ui.active_tool {
        Tool::Image => handle_image(ctx, inv),
        tool => submit_labeled(ctx, tool, inv.args, "/do <action> <input>"),
    }
}

pub(crate) fn handle_dev(
    ctx: &mut CommandContext<'_>,
    inv: CommandInvocation<'_>,
) -> CommandResult {
    submit_labeled(ctx, Tool::Developer, inv.args, "/dev <action> <input>")
}

pub(crate) fn handle_research(
    ctx: &mut CommandContext<'_>,
    inv: CommandInvocation<'_>,
) -> CommandResult {
    submit_labeled(ctx, Tool::Researcher, inv.args, "/research <action> <input>")
}

pub(crate) fn handle_image(
    ctx: &mut CommandContext<'_>,
    inv: CommandInvocation<'_>,
) -> CommandResult {
    const USAGE: &str = "Usage: /image generate <prompt> | /image edit <path> <prompt>";
    let (mode, rest) = split_word(inv.args);
    match mode.to_ascii_lowercase().as_str() {
        "generate" if !rest.is_empty() => submit(
            ctx,
            AppAction::SubmitLabeled {
                tool: Tool::Image,
                label: "Generate Image".to_string(),
                input: rest.to_string(),
                image: None,
            },
        ),
        "edit" => {
            let (path, prompt) = split_word(rest);
            if path.is_empty() || prompt.is_empty() {
                return CommandResult::Output(USAGE.to_string());
            }
            match load_inline_image(Path::new(path)) {
                Ok(image) => submit(
                    ctx,
                    AppAction::SubmitLabeled {
                        tool: Tool::Image,
                        label: "Edit Image".to_string(),
                        input: prompt.to_string(),
                        image: Some(image),
                    },
                ),
                Err(err) => CommandResult::Output(err.to_string()),
            }
        }
        _ => CommandResult::Output(USAGE.to_string()),
    }
}

pub(crate) fn handle_attach(
    ctx: &mut CommandContext<'_>,
    inv: CommandInvocation<'_>,
) -> CommandResult {
    let (path, prompt) = split_word(inv.args);
    if path.is_empty() || prompt.is_empty() {
        return CommandResult::Output("Usage: /attach <path> <prompt>".to_string());
    }
    match load_inline_image(Path::new(path)) {
        Ok(image) => submit(
            ctx,
            AppAction::Submit {
                request: ToolRequest::ImageChat {
                    prompt: prompt.to_string(),
                    image,
                },
            },
        ),
        Err(err) => CommandResult::Output(err.to_string()),
    }
}
