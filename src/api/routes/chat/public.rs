//! Public types for the chat page
use serde::Serialize;

use crate::ai::attachments::ACCEPTED_EXTENSIONS;
use crate::ai::chat::RenderMessageView;
use crate::ai::notice::NoticeView;

pub const CAPTION: &str =
    "Images use more tokens than text, rate limit will run out faster with them";

/// Everything the chat page template renders
#[derive(Serialize)]
pub struct ChatPage {
    pub title: String,
    pub caption: &'static str,
    pub messages: Vec<RenderMessageView>,
    pub notice: Option<NoticeView>,
    pub can_clear: bool,
    pub max_images: usize,
    pub accept: String,
}

impl ChatPage {
    pub fn new(
        title: String,
        messages: Vec<RenderMessageView>,
        notice: Option<NoticeView>,
        max_images: usize,
    ) -> Self {
        let accept = ACCEPTED_EXTENSIONS
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(",");
        Self {
            title,
            caption: CAPTION,
            can_clear: !messages.is_empty(),
            messages,
            notice,
            max_images,
            accept,
        }
    }
}
