//! The seam between the dispatcher and the generative-AI service.

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

use crate::core::message::Citation;

/// Base64-encoded image bytes with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(mime_type, BASE64_STANDARD.encode(bytes))
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Image(InlineImage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Text,
    Image,
}

impl Modality {
    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Text => "TEXT",
            Modality::Image => "IMAGE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// Text (and optionally image) generation from content parts.
    Content,
    /// Dedicated image synthesis from the text prompt.
    ImageGeneration {
        count: u32,
        mime_type: String,
        aspect_ratio: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub model: String,
    pub kind: RequestKind,
    pub parts: Vec<ContentPart>,
    pub grounded_search: bool,
    pub response_modalities: Vec<Modality>,
    pub stop_sequences: Vec<String>,
}

impl GenerationRequest {
    pub fn content(model: impl Into<String>, parts: Vec<ContentPart>) -> Self {
        Self {
            model: model.into(),
            kind: RequestKind::Content,
            parts,
            grounded_search: false,
            response_modalities: Vec::new(),
            stop_sequences: Vec::new(),
        }
    }

    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::content(model, vec![ContentPart::Text(prompt.into())])
    }

    pub fn image_generation(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::ImageGeneration {
                count: 1,
                mime_type: "image/png".to_string(),
                aspect_ratio: "1:1".to_string(),
            },
            ..Self::text(model, prompt)
        }
    }

    pub fn with_grounded_search(mut self) -> Self {
        self.grounded_search = true;
        self
    }

    pub fn with_response_modality(mut self, modality: Modality) -> Self {
        self.response_modalities.push(modality);
        self
    }

    pub fn with_stop_sequence(mut self, stop: impl Into<String>) -> Self {
        self.stop_sequences.push(stop.into());
        self
    }

    /// All text parts joined, in order.
    pub fn prompt_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text(text) => Some(text.as_str()),
                ContentPart::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    pub text: String,
    pub citations: Vec<Citation>,
    pub images: Vec<InlineImage>,
}

impl GenerationResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// A failed collaborator call. `message` is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorError {
    pub message: String,
    pub status: Option<u16>,
}

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }
}

impl fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for CollaboratorError {}

#[async_trait]
pub trait Collaborator: Send + Sync {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, CollaboratorError>;
}
