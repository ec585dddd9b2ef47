//! Conversation titles: a truncated provisional title up front, then a short
//! generated one once the first reply is in.

use tracing::debug;

use crate::core::collaborator::{CollaboratorError, GenerationRequest, GenerationResponse};
use crate::core::config::data::ModelConfig;

pub const PROVISIONAL_TITLE_CHARS: usize = 40;

pub fn provisional_title(first_message: &str) -> String {
    let head: String = first_message.chars().take(PROVISIONAL_TITLE_CHARS).collect();
    format!("{head}...")
}

pub fn title_request(first_message: &str, models: &ModelConfig) -> GenerationRequest {
    let prompt = format!(
        "Generate a very short, concise title (4 words maximum) for a conversation that starts with this message. Respond with only the title, no extra text, formatting, or quotation marks: \"{first_message}\""
    );
    GenerationRequest::text(&models.title, prompt).with_stop_sequence("\n")
}

/// The generated title, or the provisional one when generation failed or
/// came back blank.
pub fn finalize_title(
    result: Result<GenerationResponse, CollaboratorError>,
    first_message: &str,
) -> String {
    match result {
        Ok(response) => {
            let title = response.text.trim();
            if title.is_empty() {
                provisional_title(first_message)
            } else {
                title.to_string()
            }
        }
        Err(err) => {
            debug!(%err, "title generation failed; keeping provisional title");
            provisional_title(first_message)
        }
    }
}
