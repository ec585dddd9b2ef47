//! Plain-text rendering of conversations, lists and the command router.

use crate::core::app::App;
use crate::core::conversation::{Conversation, ConversationId};
use crate::core::message::{Speaker, Turn, TurnStatus};
use crate::core::router::CommandRouter;

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";
const MAX_MIME_LEN: usize = 64;

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}

/// Replace base64 payloads of inline `data:` URLs with their size so image
/// replies stay readable in a terminal.
pub fn elide_data_urls(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(DATA_URL_PREFIX) {
        let after_prefix = &rest[start + DATA_URL_PREFIX.len()..];
        let marker = after_prefix
            .find(BASE64_MARKER)
            .filter(|&pos| {
                pos <= MAX_MIME_LEN && !after_prefix[..pos].contains(char::is_whitespace)
            });
        let Some(marker) = marker else {
            out.push_str(&rest[..start + DATA_URL_PREFIX.len()]);
            rest = after_prefix;
            continue;
        };

        let payload_start = marker + BASE64_MARKER.len();
        let payload = &after_prefix[payload_start..];
        let payload_len = payload
            .find(|c: char| !is_base64_char(c))
            .unwrap_or(payload.len());

        out.push_str(&rest[..start]);
        out.push_str(DATA_URL_PREFIX);
        out.push_str(&after_prefix[..payload_start]);
        out.push_str(&format!("…({payload_len} chars)"));
        rest = &payload[payload_len..];
    }
    out.push_str(rest);
    out
}

pub fn render_turn(turn: &Turn) -> String {
    let prefix = match turn.speaker {
        Speaker::User => "you",
        Speaker::Model => "model",
    };
    let body = match turn.status {
        TurnStatus::Pending => "…".to_string(),
        TurnStatus::Resolved | TurnStatus::Failed => elide_data_urls(&turn.content),
    };

    let mut out = format!("{prefix}> {body}");
    for (index, citation) in turn.citations.iter().enumerate() {
        out.push_str(&format!(
            "\n    [{}] {} <{}>",
            index + 1,
            citation.label,
            citation.url
        ));
    }
    out
}

pub fn render_transcript(conversation: &Conversation) -> String {
    let mut out = format!("# {}", conversation.title);
    for turn in &conversation.turns {
        out.push_str("\n\n");
        out.push_str(&render_turn(turn));
    }
    out
}

pub fn render_conversation_list(
    conversations: &[Conversation],
    active: Option<&ConversationId>,
) -> String {
    if conversations.is_empty() {
        return "No conversations yet.".to_string();
    }
    conversations
        .iter()
        .enumerate()
        .map(|(index, conversation)| {
            let marker = if Some(&conversation.id) == active {
                '*'
            } else {
                ' '
            };
            let pending = if conversation.has_pending() {
                " (waiting)"
            } else {
                ""
            };
            format!(
                "{marker} {:>2}. {}{pending}",
                index + 1,
                conversation.title
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_router(router: &CommandRouter) -> String {
    let mut out = format!("Search: {}", router.query());
    if router.is_empty() {
        out.push_str("\n  No results found.");
        return out;
    }
    let selected = router.selected_index();
    for (index, entry) in router.results().enumerate() {
        let marker = if Some(index) == selected { '>' } else { ' ' };
        out.push_str(&format!("\n{marker} {}", entry.label));
    }
    out
}

pub fn prompt(app: &App) -> String {
    if app.ui.is_router_open() {
        return "router> ".to_string();
    }
    let tool = app.ui.active_tool.label().to_lowercase();
    if app.ui.in_flight > 0 {
        format!("[{tool} · {} waiting]> ", app.ui.in_flight)
    } else {
        format!("[{tool}]> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{Citation, PendingTicket, Reply};

    #[test]
    fn data_urls_are_shortened() {
        let text = "Here is the generated image:\n\n![cat](data:image/png;base64,QUJDRA==)";
        assert_eq!(
            elide_data_urls(text),
            "Here is the generated image:\n\n![cat](data:image/png;base64,…(8 chars))"
        );
    }

    #[test]
    fn text_without_payloads_is_untouched() {
        let text = "data: is a word here, and so is data:image/png without a marker";
        assert_eq!(elide_data_urls(text), text);
        assert_eq!(elide_data_urls(""), "");
    }

    #[test]
    fn pending_and_cited_turns_render() {
        assert_eq!(render_turn(&Turn::pending(PendingTicket(1))), "model> …");
        let turn = Turn::model(
            Reply::text("See these.").with_citations(vec![Citation::new("https://a.example", "A")]),
        );
        assert_eq!(
            render_turn(&turn),
            "model> See these.\n    [1] A <https://a.example>"
        );
    }

    #[test]
    fn list_marks_active_conversation() {
        let conversations = vec![
            Conversation::new(ConversationId::new("2"), "Second"),
            Conversation::new(ConversationId::new("1"), "First"),
        ];
        let rendered = render_conversation_list(&conversations, Some(&ConversationId::new("1")));
        assert_eq!(rendered, "   1. Second\n*  2. First");
        assert_eq!(render_conversation_list(&[], None), "No conversations yet.");
    }

    #[test]
    fn router_shows_empty_state() {
        let mut router = CommandRouter::for_conversations(&[]);
        router.set_query("zzz");
        assert_eq!(render_router(&router), "Search: zzz\n  No results found.");

        router.set_query("new");
        assert_eq!(render_router(&router), "Search: new\n> New Chat");
    }
}
