//! Image attachments uploaded alongside a chat message.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

pub const DEFAULT_MIME: &str = "image/png";

/// File extensions the chat input accepts
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Clone, Debug, PartialEq)]
pub struct ImageAttachment {
    pub name: String,
    pub mime: Option<String>,
    pub data: Vec<u8>,
}

impl ImageAttachment {
    pub fn new(name: &str, mime: Option<&str>, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            mime: mime.map(str::to_string),
            data,
        }
    }

    /// Read an image from disk, guessing the MIME type from the file
    /// extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if !is_accepted(&name, None) {
            bail!(
                "Unsupported image {}, expected one of: {}",
                path.display(),
                ACCEPTED_EXTENSIONS.join(", ")
            );
        }
        let data =
            fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
        let mime = mime_from_name(&name);
        Ok(Self::new(&name, mime, data))
    }

    /// The declared MIME type or `image/png` when unknown
    pub fn mime_type(&self) -> &str {
        match self.mime.as_deref() {
            Some(m) if !m.trim().is_empty() => m,
            _ => DEFAULT_MIME,
        }
    }

    /// Encode the image as an inline `data:` URL suitable for the
    /// `image_url` content part.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.data))
    }
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

pub fn mime_from_name(name: &str) -> Option<&'static str> {
    match extension(name)?.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// Whether an upload is one of the accepted image types, judged by
/// extension first and then by declared MIME type.
pub fn is_accepted(name: &str, mime: Option<&str>) -> bool {
    if let Some(ext) = extension(name) {
        return ACCEPTED_EXTENSIONS.contains(&ext.as_str());
    }
    matches!(mime, Some("image/jpeg") | Some("image/jpg") | Some("image/png"))
}

/// Serializable view of an attachment for rendering
#[derive(Clone, Debug, Serialize)]
pub struct ImageView {
    pub name: String,
    pub data_url: String,
}

impl From<&ImageAttachment> for ImageView {
    fn from(img: &ImageAttachment) -> Self {
        Self {
            name: img.name.clone(),
            data_url: img.to_data_url(),
        }
    }
}
