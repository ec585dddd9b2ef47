//! Named configuration keys for the `set` and `unset` subcommands.

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use crate::core::actions::Tool;
use crate::core::config::data::{Config, ModelConfig};

pub const KEYS: &[&str] = &[
    "user",
    "api-base-url",
    "history-dir",
    "default-tool",
    "models.code",
    "models.text",
    "models.vision",
    "models.image-generation",
    "models.image-edit",
    "models.title",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingError {
    UnknownKey(String),
    InvalidValue { key: String, reason: String },
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => {
                write!(f, "Unknown config key: {key} (known keys: {})", KEYS.join(", "))
            }
            SettingError::InvalidValue { key, reason } => {
                write!(f, "Invalid value for {key}: {reason}")
            }
        }
    }
}

impl StdError for SettingError {}

fn model_slot<'a>(models: &'a mut ModelConfig, key: &str) -> Option<&'a mut String> {
    match key {
        "models.code" => Some(&mut models.code),
        "models.text" => Some(&mut models.text),
        "models.vision" => Some(&mut models.vision),
        "models.image-generation" => Some(&mut models.image_generation),
        "models.image-edit" => Some(&mut models.image_edit),
        "models.title" => Some(&mut models.title),
        _ => None,
    }
}

impl Config {
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<(), SettingError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SettingError::InvalidValue {
                key: key.to_string(),
                reason: "value must not be empty".to_string(),
            });
        }
        match key {
            "user" => self.user = Some(value.to_string()),
            "api-base-url" => self.api_base_url = Some(value.to_string()),
            "history-dir" => self.history_dir = Some(PathBuf::from(value)),
            "default-tool" => {
                let tool: Tool = value.parse().map_err(|reason| SettingError::InvalidValue {
                    key: key.to_string(),
                    reason,
                })?;
                self.default_tool = Some(tool.label().to_lowercase());
            }
            other => {
                let slot = model_slot(&mut self.models, other)
                    .ok_or_else(|| SettingError::UnknownKey(other.to_string()))?;
                *slot = value.to_string();
            }
        }
        Ok(())
    }

    /// Model keys go back to their built-in defaults.
    pub fn unset_key(&mut self, key: &str) -> Result<(), SettingError> {
        match key {
            "user" => self.user = None,
            "api-base-url" => self.api_base_url = None,
            "history-dir" => self.history_dir = None,
            "default-tool" => self.default_tool = None,
            other => {
                let mut defaults = ModelConfig::default();
                let default = model_slot(&mut defaults, other)
                    .map(std::mem::take)
                    .ok_or_else(|| SettingError::UnknownKey(other.to_string()))?;
                if let Some(slot) = model_slot(&mut self.models, other) {
                    *slot = default;
                }
            }
        }
        Ok(())
    }
}
