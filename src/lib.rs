//! Parley is a line-oriented terminal client for a generative AI service.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation store, the action dispatcher that turns
//!   tool actions into optimistic exchanges, title generation, the command
//!   router and per-user identity.
//! - [`ui`] renders conversations as text and runs the interactive shell.
//! - [`commands`] implements slash-command parsing and execution for the
//!   shell.
//! - [`api`] defines the service wire payloads and the HTTP client behind
//!   [`core::collaborator::Collaborator`].
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which dispatches into [`ui::shell`] for
//! interactive sessions.

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
