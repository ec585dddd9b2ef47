//! Terminal presentation.
//!
//! - [`shell`]: the interactive loop that feeds input to [`crate::commands`]
//!   and runs collaborator calls off the loop.
//! - [`renderer`]: plain-text views of turns, lists and the command router.

pub mod renderer;
pub mod shell;
