//! Public types for the session API
use serde::Serialize;

use crate::ai::chat::RenderMessageView;
use crate::ai::notice::NoticeView;

#[derive(Serialize)]
pub struct SessionResponse {
    pub title: Option<String>,
    pub messages: Vec<RenderMessageView>,
    pub notice: Option<NoticeView>,
}
