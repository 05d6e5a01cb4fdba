//! The core models for managing a stateful chat with an LLM.
//!
//! A chat keeps two logs side by side: what gets rendered for the
//! user and what gets sent to the model. They only ever change
//! together.
use serde::Serialize;

use crate::ai::attachments::{ImageAttachment, ImageView};
use crate::openai::{Message, Role};

/// Messages in the shape the chat completion API expects
#[derive(Default, Clone, Debug)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn new_with_messages(messages: Vec<Message>) -> Self {
        Self(messages)
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn push(&mut self, msg: Message) {
        self.0.push(msg)
    }

    pub fn pop(&mut self) -> Option<Message> {
        self.0.pop()
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.0.iter()
    }
}

/// A message as it's shown to the user
#[derive(Clone, Debug, PartialEq)]
pub struct RenderMessage {
    pub role: Role,
    pub content: String,
    pub images: Vec<ImageAttachment>,
}

impl RenderMessage {
    pub fn user(content: &str, images: Vec<ImageAttachment>) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
            images,
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
            images: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RenderMessageView {
    pub role: Role,
    pub content: String,
    pub images: Vec<ImageView>,
}

impl From<&RenderMessage> for RenderMessageView {
    fn from(msg: &RenderMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
            images: msg.images.iter().map(ImageView::from).collect(),
        }
    }
}

/// The display log and the API transcript for a single session
#[derive(Default, Clone, Debug)]
pub struct ChatLog {
    render_messages: Vec<RenderMessage>,
    transcript: Transcript,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, display: RenderMessage, msg: Message) {
        self.render_messages.push(display);
        self.transcript.push(msg);
    }

    pub fn push_assistant(&mut self, content: &str) {
        self.render_messages.push(RenderMessage::assistant(content));
        self.transcript.push(Message::new(Role::Assistant, content));
    }

    /// Drop the most recent entry from both logs
    pub fn rollback(&mut self) {
        self.render_messages.pop();
        self.transcript.pop();
    }

    pub fn clear(&mut self) {
        self.render_messages.clear();
        self.transcript.clear();
    }

    pub fn render_messages(&self) -> &[RenderMessage] {
        &self.render_messages
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn len(&self) -> usize {
        self.render_messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.render_messages.is_empty()
    }
}
