//! `parley history`: read a user's stored conversations without starting
//! the shell.

use std::error::Error;
use std::fs;
use std::path::Path;

use chrono::Local;

use crate::commands::resolve_conversation;
use crate::core::config::data::path_display;
use crate::core::conversation::Conversation;
use crate::core::store::ConversationStore;
use crate::ui::renderer::{render_conversation_list, render_transcript};

pub fn list_conversations(store: &ConversationStore) {
    println!("{}", render_conversation_list(store.list(), None));
}

/// Transcript with an export stamp. Image payloads are shortened as in
/// the shell.
pub fn transcript_for_export(conversation: &Conversation, stamp: &str) -> String {
    let mut out = render_transcript(conversation);
    out.push_str(&format!("\n\n-- exported {stamp} (id {})\n", conversation.id));
    out
}

pub fn export_conversation(
    store: &ConversationStore,
    reference: &str,
    file: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let Some(conversation) =
        resolve_conversation(store.list(), reference).and_then(|id| store.get(&id))
    else {
        eprintln!("❌ No conversation matches '{reference}'. Try 'parley history list'.");
        std::process::exit(1);
    };

    let stamp = Local::now().format("%Y-%m-%d %H:%M").to_string();
    let transcript = transcript_for_export(conversation, &stamp);
    match file {
        Some(path) => {
            fs::write(path, transcript)?;
            println!("✅ Exported \"{}\" to {}", conversation.title, path_display(path));
        }
        None => print!("{transcript}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::ConversationId;
    use crate::core::message::{Reply, Turn};

    #[test]
    fn export_shortens_payloads_and_stamps_the_end() {
        let mut conversation = Conversation::new(ConversationId::new("42"), "Cats");
        conversation.turns.push(Turn::user("draw a cat"));
        conversation
            .turns
            .push(Turn::model(Reply::text("![cat](data:image/png;base64,QUJD)")));

        let text = transcript_for_export(&conversation, "2024-01-02 03:04");
        assert!(text.starts_with("# Cats\n\nyou> draw a cat"));
        assert!(text.contains("model> ![cat](data:image/png;base64,…(4 chars))"));
        assert!(text.ends_with("-- exported 2024-01-02 03:04 (id 42)\n"));
    }
}
