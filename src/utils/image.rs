//! Reading local images for attachment and editing.

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::collaborator::InlineImage;
use crate::core::config::data::path_display;

#[derive(Debug)]
pub enum ImageLoadError {
    UnsupportedType(PathBuf),
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for ImageLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageLoadError::UnsupportedType(path) => write!(
                f,
                "Unsupported image type: {} (use png, jpg, gif or webp)",
                path_display(path)
            ),
            ImageLoadError::Read { path, source } => {
                write!(f, "Failed to read {}: {}", path_display(path), source)
            }
        }
    }
}

impl StdError for ImageLoadError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ImageLoadError::Read { source, .. } => Some(source),
            ImageLoadError::UnsupportedType(_) => None,
        }
    }
}

pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

pub fn load_inline_image(path: &Path) -> Result<InlineImage, ImageLoadError> {
    let mime_type =
        mime_type_for(path).ok_or_else(|| ImageLoadError::UnsupportedType(path.to_path_buf()))?;
    let bytes = fs::read(path).map_err(|source| ImageLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(InlineImage::from_bytes(mime_type, &bytes))
}
