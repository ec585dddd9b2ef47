use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::gemini::DEFAULT_BASE_URL;
use crate::core::actions::Tool;
use crate::core::persistence::FileStore;

pub const DEFAULT_CODE_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_GENERATION_MODEL: &str = "imagen-4.0-generate-001";
pub const DEFAULT_IMAGE_EDIT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TITLE_MODEL: &str = "gemini-2.5-flash";

fn default_code_model() -> String {
    DEFAULT_CODE_MODEL.to_string()
}

fn default_text_model() -> String {
    DEFAULT_TEXT_MODEL.to_string()
}

fn default_vision_model() -> String {
    DEFAULT_VISION_MODEL.to_string()
}

fn default_image_generation_model() -> String {
    DEFAULT_IMAGE_GENERATION_MODEL.to_string()
}

fn default_image_edit_model() -> String {
    DEFAULT_IMAGE_EDIT_MODEL.to_string()
}

fn default_title_model() -> String {
    DEFAULT_TITLE_MODEL.to_string()
}

/// Which model serves each kind of request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Developer tool actions
    #[serde(default = "default_code_model")]
    pub code: String,
    /// Researcher actions and plain chat
    #[serde(default = "default_text_model")]
    pub text: String,
    /// Chat messages with an attached image
    #[serde(default = "default_vision_model")]
    pub vision: String,
    #[serde(default = "default_image_generation_model")]
    pub image_generation: String,
    #[serde(default = "default_image_edit_model")]
    pub image_edit: String,
    #[serde(default = "default_title_model")]
    pub title: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            code: default_code_model(),
            text: default_text_model(),
            vision: default_vision_model(),
            image_generation: default_image_generation_model(),
            image_edit: default_image_edit_model(),
            title: default_title_model(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Identity to sign in as when the shell starts
    pub user: Option<String>,
    /// Override for the generative service endpoint
    pub api_base_url: Option<String>,
    /// Directory holding per-user conversation history
    pub history_dir: Option<PathBuf>,
    /// Tool selected when the shell starts ("developer", "researcher", "image")
    pub default_tool: Option<String>,
    #[serde(default)]
    pub models: ModelConfig,
}

impl Config {
    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    /// Configured tool, falling back to the developer tool when unset or
    /// unrecognized.
    pub fn default_tool(&self) -> Tool {
        self.default_tool
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(Tool::Developer)
    }

    pub fn history_dir(&self) -> Option<PathBuf> {
        self.history_dir.clone().or_else(FileStore::default_dir)
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.local/share/parley/history` → `~/.local/share/parley/history`
/// - Windows: paths are shown unchanged
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
