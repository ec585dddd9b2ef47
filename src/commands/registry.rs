use super::handlers::{conversations, core, session, tools};
use super::{CommandContext, CommandResult};

pub type CommandHandler = fn(&mut CommandContext<'_>, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: core::handle_help,
    },
    Command {
        name: "new",
        usage: "/new",
        help: "Start a new conversation with the next message.",
        handler: conversations::handle_new,
    },
    Command {
        name: "list",
        usage: "/list",
        help: "List conversations, newest first.",
        handler: conversations::handle_list,
    },
    Command {
        name: "open",
        usage: "/open <n|id>",
        help: "Select a conversation and show its transcript.",
        handler: conversations::handle_open,
    },
    Command {
        name: "delete",
        usage: "/delete [n|id]",
        help: "Delete a conversation (the active one by default).",
        handler: conversations::handle_delete,
    },
    Command {
        name: "rename",
        usage: "/rename <title>",
        help: "Rename the active conversation.",
        handler: conversations::handle_rename,
    },
    Command {
        name: "tool",
        usage: "/tool <developer|researcher|image>",
        help: "Switch the active tool.",
        handler: tools::handle_tool,
    },
    Command {
        name: "do",
        usage: "/do <action> <input>",
        help: "Run an action of the active tool, e.g. /do explain-code fn main() {}",
        handler: tools::handle_do,
    },
    Command {
        name: "dev",
        usage: "/dev <action> <input>",
        help: "Developer actions: generate-code, explain-code, refactor-code, find-bugs.",
        handler: tools::handle_dev,
    },
    Command {
        name: "research",
        usage: "/research <action> <input>",
        help: "Researcher actions: summarize-text, find-sources, explain-concepts, generate-outline.",
        handler: tools::handle_research,
    },
    Command {
        name: "image",
        usage: "/image generate <prompt> | /image edit <path> <prompt>",
        help: "Generate an image, or edit a local image file.",
        handler: tools::handle_image,
    },
    Command {
        name: "attach",
        usage: "/attach <path> <prompt>",
        help: "Ask about a local image file.",
        handler: tools::handle_attach,
    },
    Command {
        name: "palette",
        usage: "/palette [query]",
        help: "Open the command router (also Ctrl+K).",
        handler: core::handle_palette,
    },
    Command {
        name: "login",
        usage: "/login <user>",
        help: "Sign in and load that user's history.",
        handler: session::handle_login,
    },
    Command {
        name: "logout",
        usage: "/logout",
        help: "Sign out and clear the screen state.",
        handler: session::handle_logout,
    },
    Command {
        name: "whoami",
        usage: "/whoami",
        help: "Show the signed-in user.",
        handler: session::handle_whoami,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave parley. Pending replies are abandoned.",
        handler: core::handle_quit,
    },
];
