//! [`Collaborator`] backed by the Gemini REST API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    GoogleSearch, InlineData, OutputOptions, Part, PredictInstance, PredictParameters,
    PredictRequest, PredictResponse, ToolConfig,
};
use crate::core::collaborator::{
    Collaborator, CollaboratorError, ContentPart, GenerationRequest, GenerationResponse,
    InlineImage, RequestKind,
};
use crate::core::message::Citation;
use crate::utils::url::model_method_url;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_key, base_url)
    }

    pub fn with_client(
        client: reqwest::Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R, CollaboratorError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(url, "posting generation request");
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| CollaboratorError::new(err.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| CollaboratorError::with_status(err.to_string(), status.as_u16()))?;
        if !status.is_success() {
            return Err(summarize_error(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|err| {
            CollaboratorError::new(format!("Unexpected response from the service: {err}"))
        })
    }
}

#[async_trait]
impl Collaborator for GeminiClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, CollaboratorError> {
        match &request.kind {
            RequestKind::Content => {
                let url = model_method_url(&self.base_url, &request.model, "generateContent");
                let response: GenerateContentResponse =
                    self.post(&url, &content_body(&request)).await?;
                Ok(parse_content_response(response))
            }
            RequestKind::ImageGeneration { .. } => {
                let url = model_method_url(&self.base_url, &request.model, "predict");
                let response: PredictResponse = self.post(&url, &predict_body(&request)).await?;
                Ok(parse_predict_response(response))
            }
        }
    }
}

pub(crate) fn content_body(request: &GenerationRequest) -> GenerateContentRequest {
    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => Part {
                text: Some(text.clone()),
                inline_data: None,
            },
            ContentPart::Image(image) => Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                }),
            },
        })
        .collect();

    let tools = if request.grounded_search {
        vec![ToolConfig {
            google_search: GoogleSearch {},
        }]
    } else {
        Vec::new()
    };

    let generation_config = (!request.stop_sequences.is_empty()
        || !request.response_modalities.is_empty())
    .then(|| GenerationConfig {
        stop_sequences: request.stop_sequences.clone(),
        response_modalities: request
            .response_modalities
            .iter()
            .map(|modality| modality.as_str().to_string())
            .collect(),
    });

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        tools,
        generation_config,
    }
}

pub(crate) fn predict_body(request: &GenerationRequest) -> PredictRequest {
    let (count, mime_type, aspect_ratio) = match &request.kind {
        RequestKind::ImageGeneration {
            count,
            mime_type,
            aspect_ratio,
        } => (*count, mime_type.clone(), aspect_ratio.clone()),
        RequestKind::Content => (1, "image/png".to_string(), "1:1".to_string()),
    };
    PredictRequest {
        instances: vec![PredictInstance {
            prompt: request.prompt_text(),
        }],
        parameters: PredictParameters {
            sample_count: count,
            aspect_ratio,
            output_options: OutputOptions { mime_type },
        },
    }
}

/// Text and images of the first candidate, plus its web grounding sources
/// with duplicate URLs removed.
pub(crate) fn parse_content_response(response: GenerateContentResponse) -> GenerationResponse {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return GenerationResponse::default();
    };

    let mut result = GenerationResponse::default();
    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
        if let Some(text) = part.text {
            result.text.push_str(&text);
        }
        if let Some(data) = part.inline_data {
            result
                .images
                .push(InlineImage::new(data.mime_type, data.data));
        }
    }

    let chunks = candidate
        .grounding_metadata
        .map(|metadata| metadata.grounding_chunks)
        .unwrap_or_default();
    for web in chunks.into_iter().filter_map(|chunk| chunk.web) {
        let Some(uri) = web.uri.filter(|uri| !uri.is_empty()) else {
            continue;
        };
        if result.citations.iter().any(|c| c.url == uri) {
            continue;
        }
        let label = web
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| uri.clone());
        result.citations.push(Citation::new(uri, label));
    }
    result
}

pub(crate) fn parse_predict_response(response: PredictResponse) -> GenerationResponse {
    let images = response
        .predictions
        .into_iter()
        .filter_map(|prediction| {
            let data = prediction.bytes_base64_encoded?;
            let mime_type = prediction
                .mime_type
                .unwrap_or_else(|| "image/png".to_string());
            Some(InlineImage::new(mime_type, data))
        })
        .collect();
    GenerationResponse {
        images,
        ..GenerationResponse::default()
    }
}

/// Reduce an error body to the service's own message when it has one.
pub(crate) fn summarize_error(status: u16, body: &str) -> CollaboratorError {
    let from_envelope = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|message| !message.trim().is_empty());

    let message = match from_envelope {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => format!("Request failed with HTTP status {status}"),
    };
    CollaboratorError::with_status(message, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collaborator::Modality;
    use serde_json::json;

    #[test]
    fn content_body_uses_camel_case_wire_names() {
        let request = GenerationRequest::content(
            "gemini-2.5-flash-image",
            vec![
                ContentPart::Image(InlineImage::new("image/png", "AAAA")),
                ContentPart::Text("make it blue".into()),
            ],
        )
        .with_response_modality(Modality::Image);

        let body = serde_json::to_value(content_body(&request)).expect("serialize");
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
                        {"text": "make it blue"}
                    ]
                }],
                "generationConfig": {"responseModalities": ["IMAGE"]}
            })
        );
    }

    #[test]
    fn grounded_search_adds_google_search_tool() {
        let request = GenerationRequest::text("gemini-2.5-flash", "topic")
            .with_grounded_search()
            .with_stop_sequence("\n");
        let body = serde_json::to_value(content_body(&request)).expect("serialize");
        assert_eq!(body["tools"], json!([{"googleSearch": {}}]));
        assert_eq!(body["generationConfig"], json!({"stopSequences": ["\n"]}));
    }

    #[test]
    fn plain_text_body_has_no_optional_sections() {
        let body = serde_json::to_value(content_body(&GenerationRequest::text("m", "hi")))
            .expect("serialize");
        assert!(body.get("tools").is_none());
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn predict_body_requests_one_square_png() {
        let request = GenerationRequest::image_generation("imagen-4.0-generate-001", "a fox");
        let body = serde_json::to_value(predict_body(&request)).expect("serialize");
        assert_eq!(
            body,
            json!({
                "instances": [{"prompt": "a fox"}],
                "parameters": {
                    "sampleCount": 1,
                    "aspectRatio": "1:1",
                    "outputOptions": {"mimeType": "image/png"}
                }
            })
        );
    }

    #[test]
    fn content_response_collects_text_images_and_unique_sources() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "Hello, "},
                    {"text": "world"},
                    {"inlineData": {"mimeType": "image/png", "data": "QUJD"}}
                ]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "https://a.example", "title": "A"}},
                    {"web": {"uri": "https://a.example", "title": "A again"}},
                    {"web": {"uri": "https://b.example"}},
                    {}
                ]}
            }]
        }))
        .expect("deserialize");

        let parsed = parse_content_response(response);
        assert_eq!(parsed.text, "Hello, world");
        assert_eq!(parsed.images, vec![InlineImage::new("image/png", "QUJD")]);
        assert_eq!(
            parsed.citations,
            vec![
                Citation::new("https://a.example", "A"),
                Citation::new("https://b.example", "https://b.example"),
            ]
        );
    }

    #[test]
    fn empty_candidates_yield_empty_response() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({})).expect("deserialize");
        assert_eq!(parse_content_response(response), GenerationResponse::default());
    }

    #[test]
    fn predict_response_skips_predictions_without_bytes() {
        let response: PredictResponse = serde_json::from_value(json!({
            "predictions": [
                {"raiFilteredReason": "blocked"},
                {"bytesBase64Encoded": "UE5H", "mimeType": "image/png"}
            ]
        }))
        .expect("deserialize");
        let parsed = parse_predict_response(response);
        assert_eq!(parsed.images, vec![InlineImage::new("image/png", "UE5H")]);
    }

    #[test]
    fn error_summary_prefers_service_message() {
        let body = r#"{"error":{"code":429,"message":"rate limited","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = summarize_error(429, body);
        assert_eq!(err.message, "rate limited");
        assert_eq!(err.status, Some(429));

        assert_eq!(summarize_error(502, " Bad gateway \n").message, "Bad gateway");
        assert_eq!(
            summarize_error(500, "").message,
            "Request failed with HTTP status 500"
        );
    }
}
