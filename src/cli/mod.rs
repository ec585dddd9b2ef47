//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod history;
pub mod say;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::api::gemini::GeminiClient;
use crate::auth::AuthManager;
use crate::cli::history::{export_conversation, list_conversations};
use crate::cli::say::run_say;
use crate::core::actions::Tool;
use crate::core::app::App;
use crate::core::config::data::path_display;
use crate::core::config::Config;
use crate::core::identity::{IdentityStore, UserIdentity};
use crate::core::persistence::{DurableStore, FileStore, MemoryStore};
use crate::core::store::ConversationStore;
use crate::ui::shell::run_shell;
use crate::utils::logging::init_tracing;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("VERGEN_GIT_SHA"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ")\nbuilt: ",
    env!("VERGEN_BUILD_DATE"),
    "\nrustc: ",
    env!("VERGEN_RUSTC_SEMVER"),
);

#[derive(Parser)]
#[command(name = "parley")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A terminal assistant with developer, researcher and image tools")]
#[command(
    long_about = "Parley is a line-oriented terminal client for a generative AI service. \
Messages are answered in the background while you keep typing, and every \
conversation is saved per user.\n\n\
Authentication:\n\
  Use 'parley auth' to store an API key in your system keyring.\n\n\
Environment Variables (fallback if no key is stored):\n\
  GEMINI_API_KEY    Your API key\n\
  API_KEY           Used when GEMINI_API_KEY is unset\n\
  PARLEY_LOG        Log filter (e.g. debug, parley=trace)\n\n\
Controls:\n\
  Enter             Send the line\n\
  Ctrl+K, Enter     Toggle the command router\n\
  /help             List every command"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Sign in as this user (overrides the `user` config key)
    #[arg(short = 'u', long, global = true)]
    pub user: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(short = 'l', long, global = true)]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive shell (default)
    Chat,
    /// Run one tool action and print the reply
    Say {
        /// Tool to use: developer, researcher or image
        tool: Tool,
        /// Action label, e.g. explain-code, summarize-text, generate
        action: String,
        /// Input text for the action
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        input: Vec<String>,
        /// Image file for actions that edit an image
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Store an API key in the system keyring
    Auth,
    /// Remove the stored API key
    Deauth,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key (multiple words are joined)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Inspect stored conversations
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List stored conversations, newest first
    List,
    /// Write a conversation transcript to a file or stdout
    Export {
        /// Position in the list (1-based) or conversation id
        reference: String,
        /// Output file; prints to stdout when omitted
        file: Option<PathBuf>,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

/// The history backend: files under the configured directory, or memory
/// when no data directory can be determined.
pub(crate) fn history_backend(config: &Config) -> Box<dyn DurableStore> {
    match config.history_dir() {
        Some(dir) => {
            tracing::debug!(dir = %path_display(&dir), "using file-backed history");
            Box::new(FileStore::new(dir))
        }
        None => {
            eprintln!("⚠️  No data directory available; history will not be saved");
            Box::new(MemoryStore::new())
        }
    }
}

pub(crate) fn resolve_user(args_user: Option<String>, config: &Config) -> Option<UserIdentity> {
    args_user
        .or_else(|| config.user.clone())
        .map(|user| user.trim().to_string())
        .filter(|user| !user.is_empty())
        .map(UserIdentity::new)
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.log.as_deref())?;

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Auth => {
            let auth_manager = AuthManager::new();
            if let Err(e) = auth_manager.interactive_auth() {
                eprintln!("❌ Authentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Deauth => {
            let auth_manager = AuthManager::new();
            if let Err(e) = auth_manager.interactive_deauth() {
                eprintln!("❌ Deauthentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let value = value.map(|parts| parts.join(" ")).unwrap_or_default();
            if value.trim().is_empty() {
                config.print_all();
                return Ok(());
            }
            if let Err(e) = config.set_key(&key, &value) {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Set {key} to: {}", value.trim());
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            if let Err(e) = config.unset_key(&key) {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::History { command } => {
            let config = Config::load()?;
            let Some(user) = resolve_user(args.user, &config) else {
                eprintln!("❌ No user given. Pass --user or run 'parley set user <name>'.");
                std::process::exit(1);
            };
            let mut store = ConversationStore::new(history_backend(&config));
            store.attach_user(&user.id);
            match command {
                HistoryCommand::List => {
                    list_conversations(&store);
                    Ok(())
                }
                HistoryCommand::Export { reference, file } => {
                    export_conversation(&store, &reference, file.as_deref())
                }
            }
        }
        Commands::Say {
            tool,
            action,
            input,
            image,
        } => {
            let config = Config::load()?;
            let user = resolve_user(args.user, &config);
            run_say(&config, user, tool, action, input.join(" "), image).await
        }
        Commands::Chat => {
            let config = Config::load()?;
            let api_key = match AuthManager::new().resolve_api_key() {
                Ok(key) => key,
                Err(e) => {
                    eprintln!("❌ {e}");
                    std::process::exit(1);
                }
            };
            let collaborator = Arc::new(GeminiClient::new(api_key, config.api_base_url()));
            let store = ConversationStore::new(history_backend(&config));
            let app = App::new(store, config.models.clone(), config.default_tool());
            let identity = IdentityStore::new(resolve_user(args.user, &config));
            run_shell(app, identity, collaborator).await
        }
    }
}
