//! Tool actions and the prompts they send.
//!
//! Each user-initiated action is a [`ToolRequest`] variant. A request knows
//! how it appears in the transcript ([`ToolRequest::user_content`]), which
//! collaborator call it makes ([`ToolRequest::build_request`]) and how the
//! response becomes a model turn ([`ToolRequest::shape_reply`]). All three are
//! pure.

use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

use crate::core::collaborator::{
    ContentPart, GenerationRequest, GenerationResponse, InlineImage, Modality,
};
use crate::core::config::data::ModelConfig;
use crate::core::message::Reply;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Developer,
    Researcher,
    Image,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Developer, Tool::Researcher, Tool::Image];

    pub fn label(self) -> &'static str {
        match self {
            Tool::Developer => "Developer",
            Tool::Researcher => "Researcher",
            Tool::Image => "Image",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "developer" | "dev" => Ok(Tool::Developer),
            "researcher" | "research" => Ok(Tool::Researcher),
            "image" | "images" => Ok(Tool::Image),
            other => Err(format!("unknown tool: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The action label does not name an action of that tool.
    UnsupportedAction { tool: Tool, label: String },
    /// Editing needs an image and none was supplied.
    MissingImage,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::UnsupportedAction { tool, label } => {
                write!(f, "Unsupported {} action: {}", tool.label().to_lowercase(), label)
            }
            DispatchError::MissingImage => f.write_str("Image data is required for editing."),
        }
    }
}

impl StdError for DispatchError {}

/// Lowercase, with `-`/`_` treated as spaces and runs of whitespace collapsed,
/// so "Explain Code", "explain-code" and "EXPLAIN_CODE" compare equal.
fn normalize_label(raw: &str) -> String {
    raw.replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn parse_label<T: Copy>(
    all: &[T],
    label_of: fn(T) -> &'static str,
    tool: Tool,
    raw: &str,
) -> Result<T, DispatchError> {
    let wanted = normalize_label(raw);
    all.iter()
        .copied()
        .find(|candidate| normalize_label(label_of(*candidate)) == wanted)
        .ok_or_else(|| DispatchError::UnsupportedAction {
            tool,
            label: raw.trim().to_string(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeveloperAction {
    GenerateCode,
    ExplainCode,
    RefactorCode,
    FindBugs,
}

impl DeveloperAction {
    pub const ALL: [DeveloperAction; 4] = [
        DeveloperAction::GenerateCode,
        DeveloperAction::ExplainCode,
        DeveloperAction::RefactorCode,
        DeveloperAction::FindBugs,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DeveloperAction::GenerateCode => "Generate Code",
            DeveloperAction::ExplainCode => "Explain Code",
            DeveloperAction::RefactorCode => "Refactor Code",
            DeveloperAction::FindBugs => "Find Bugs",
        }
    }

    pub fn prompt(self, input: &str) -> String {
        match self {
            DeveloperAction::GenerateCode => format!(
                "Generate code for the following description, making sure to include language identifiers for markdown code blocks: {input}"
            ),
            DeveloperAction::ExplainCode => {
                format!("Explain the following code snippet:\n```\n{input}\n```")
            }
            DeveloperAction::RefactorCode => format!(
                "Refactor the following code to improve it. Provide the refactored code in a markdown block with the correct language identifier:\n```\n{input}\n```"
            ),
            DeveloperAction::FindBugs => format!(
                "Find potential bugs in the following code. Explain the bug and provide a corrected version in a markdown block with the correct language identifier:\n```\n{input}\n```"
            ),
        }
    }
}

impl FromStr for DeveloperAction {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(&Self::ALL, Self::label, Tool::Developer, s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResearcherAction {
    SummarizeText,
    FindSources,
    ExplainConcepts,
    GenerateOutline,
}

impl ResearcherAction {
    pub const ALL: [ResearcherAction; 4] = [
        ResearcherAction::SummarizeText,
        ResearcherAction::FindSources,
        ResearcherAction::ExplainConcepts,
        ResearcherAction::GenerateOutline,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ResearcherAction::SummarizeText => "Summarize Text",
            ResearcherAction::FindSources => "Find Sources",
            ResearcherAction::ExplainConcepts => "Explain Concepts",
            ResearcherAction::GenerateOutline => "Generate Outline",
        }
    }

    pub fn prompt(self, input: &str) -> String {
        match self {
            ResearcherAction::SummarizeText => format!("Summarize the following text:\n\n{input}"),
            ResearcherAction::FindSources => {
                format!("Find reliable sources and citations for the following topic: {input}")
            }
            ResearcherAction::ExplainConcepts => {
                format!("Explain the following concept in simple terms: {input}")
            }
            ResearcherAction::GenerateOutline => format!(
                "Generate a structured outline for a paper/article on this topic: {input}"
            ),
        }
    }

    /// Only source finding asks the service to ground its answer in web search.
    pub fn uses_search(self) -> bool {
        self == ResearcherAction::FindSources
    }
}

impl FromStr for ResearcherAction {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(&Self::ALL, Self::label, Tool::Researcher, s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageAction {
    Generate,
    Edit,
}

impl ImageAction {
    pub const ALL: [ImageAction; 2] = [ImageAction::Generate, ImageAction::Edit];

    pub fn label(self) -> &'static str {
        match self {
            ImageAction::Generate => "Generate Image",
            ImageAction::Edit => "Edit Image",
        }
    }
}

impl FromStr for ImageAction {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "generate" and "edit" are accepted on their own as well.
        let normalized = normalize_label(s);
        match normalized.as_str() {
            "generate" => Ok(ImageAction::Generate),
            "edit" => Ok(ImageAction::Edit),
            _ => parse_label(&Self::ALL, Self::label, Tool::Image, s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    Developer {
        action: DeveloperAction,
        input: String,
    },
    Researcher {
        action: ResearcherAction,
        input: String,
    },
    GenerateImage {
        prompt: String,
    },
    EditImage {
        prompt: String,
        image: InlineImage,
    },
    Chat {
        message: String,
    },
    ImageChat {
        prompt: String,
        image: InlineImage,
    },
}

impl ToolRequest {
    /// Build a request from a tool and an action label, failing before any
    /// network call when the label is not one of that tool's actions.
    pub fn from_label(
        tool: Tool,
        label: &str,
        input: impl Into<String>,
        image: Option<InlineImage>,
    ) -> Result<Self, DispatchError> {
        let input = input.into();
        match tool {
            Tool::Developer => Ok(ToolRequest::Developer {
                action: label.parse()?,
                input,
            }),
            Tool::Researcher => Ok(ToolRequest::Researcher {
                action: label.parse()?,
                input,
            }),
            Tool::Image => match label.parse::<ImageAction>()? {
                ImageAction::Generate => Ok(ToolRequest::GenerateImage { prompt: input }),
                ImageAction::Edit => {
                    let image = image.ok_or(DispatchError::MissingImage)?;
                    Ok(ToolRequest::EditImage {
                        prompt: input,
                        image,
                    })
                }
            },
        }
    }

    pub fn tool(&self) -> Option<Tool> {
        match self {
            ToolRequest::Developer { .. } => Some(Tool::Developer),
            ToolRequest::Researcher { .. } => Some(Tool::Researcher),
            ToolRequest::GenerateImage { .. } | ToolRequest::EditImage { .. } => Some(Tool::Image),
            ToolRequest::Chat { .. } | ToolRequest::ImageChat { .. } => None,
        }
    }

    /// Text of the user turn shown in the transcript.
    pub fn user_content(&self) -> String {
        match self {
            ToolRequest::Developer { action, input } => {
                format!("{}:\n```\n{}\n```", action.label(), input)
            }
            ToolRequest::Researcher { action, input } => {
                let quoted = input.split('\n').collect::<Vec<_>>().join("\n> ");
                format!("{}:\n\n> {}", action.label(), quoted)
            }
            ToolRequest::GenerateImage { prompt } => {
                format!("{}: {}", ImageAction::Generate.label(), prompt)
            }
            ToolRequest::EditImage { prompt, .. } => {
                format!("{}: {}", ImageAction::Edit.label(), prompt)
            }
            ToolRequest::Chat { message } => message.clone(),
            ToolRequest::ImageChat { prompt, image } => {
                format!("{}\n\n![User Upload]({})", prompt, image.data_url())
            }
        }
    }

    pub fn build_request(&self, models: &ModelConfig) -> GenerationRequest {
        match self {
            ToolRequest::Developer { action, input } => {
                GenerationRequest::text(&models.code, action.prompt(input))
            }
            ToolRequest::Researcher { action, input } => {
                let request = GenerationRequest::text(&models.text, action.prompt(input));
                if action.uses_search() {
                    request.with_grounded_search()
                } else {
                    request
                }
            }
            ToolRequest::GenerateImage { prompt } => {
                GenerationRequest::image_generation(&models.image_generation, prompt.clone())
            }
            ToolRequest::EditImage { prompt, image } => GenerationRequest::content(
                &models.image_edit,
                vec![
                    ContentPart::Image(image.clone()),
                    ContentPart::Text(prompt.clone()),
                ],
            )
            .with_response_modality(Modality::Image),
            ToolRequest::Chat { message } => GenerationRequest::text(&models.text, message.clone()),
            ToolRequest::ImageChat { prompt, image } => GenerationRequest::content(
                &models.vision,
                vec![
                    ContentPart::Text(prompt.clone()),
                    ContentPart::Image(image.clone()),
                ],
            ),
        }
    }

    pub fn shape_reply(&self, response: GenerationResponse) -> Reply {
        match self {
            ToolRequest::GenerateImage { prompt } => match response.images.first() {
                Some(image) => Reply::text(format!(
                    "Here is the generated image:\n\n![{}]({})",
                    prompt,
                    image.data_url()
                )),
                None => Reply::text("Sorry, I couldn't generate an image. Please try again."),
            },
            ToolRequest::EditImage { .. } => match response.images.first() {
                Some(image) => Reply::text(format!(
                    "Here is the edited image:\n\n![Edited image]({})",
                    image.data_url()
                )),
                None => Reply::text("Sorry, I couldn't edit the image. Please try again."),
            },
            ToolRequest::Researcher { .. } => {
                Reply::text(response.text).with_citations(response.citations)
            }
            ToolRequest::Developer { .. }
            | ToolRequest::Chat { .. }
            | ToolRequest::ImageChat { .. } => Reply::text(response.text),
        }
    }
}
