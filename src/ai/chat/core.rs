use anyhow::{Error, Result};

use super::models::{ChatLog, RenderMessage};
use crate::ai::attachments::ImageAttachment;
use crate::ai::title::{CachedTitle, TimeOfDay, generate_title};
use crate::core::AppConfig;
use crate::openai::{ContentPart, Message, Role, completion_content};

/// What the user submitted in one turn
#[derive(Clone, Debug, Default)]
pub struct UserInput {
    pub text: Option<String>,
    pub images: Vec<ImageAttachment>,
}

impl UserInput {
    pub fn new(text: Option<&str>, images: Vec<ImageAttachment>) -> Self {
        Self {
            text: text.map(str::to_string),
            images,
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(Some(text), Vec::new())
    }
}

/// The core abstraction around interacting with an LLM in a chat
/// completion style using an OpenAI compatible API.
///
/// Holds the session's display log and API transcript and keeps them
/// in step: a turn that fails leaves both exactly as they were.
///
/// Use `ChatBuilder` to construct a valid `Chat`.
pub struct Chat {
    api_base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    system_message: Option<String>,
    max_images: usize,
    log: ChatLog,
    title: Option<CachedTitle>,
}

impl Chat {
    /// Runs the next turn in chat. Returns `Ok(None)` when the input
    /// had nothing to send.
    ///
    /// On error the user's message is removed from both logs before
    /// returning so the caller only needs to report the failure.
    pub async fn next_msg(&mut self, input: UserInput) -> Result<Option<String>, Error> {
        let text = input.text.filter(|t| !t.is_empty());
        let images: Vec<ImageAttachment> =
            input.images.into_iter().take(self.max_images).collect();

        let mut parts = Vec::new();
        if let Some(t) = &text {
            parts.push(ContentPart::text(t));
        }
        for img in images.iter() {
            parts.push(ContentPart::image_url(&img.to_data_url()));
        }
        if parts.is_empty() {
            return Ok(None);
        }

        self.log.push_user(
            RenderMessage::user(text.as_deref().unwrap_or(""), images),
            Message::new_with_parts(Role::User, parts),
        );

        match self.chat().await {
            Ok(reply) => {
                self.log.push_assistant(&reply);
                Ok(Some(reply))
            }
            Err(e) => {
                tracing::error!("Chat turn failed: {:#}", e);
                self.log.rollback();
                Err(e)
            }
        }
    }

    async fn chat(&self) -> Result<String, Error> {
        let mut history = Vec::with_capacity(self.log.transcript().len() + 1);
        if let Some(system) = &self.system_message {
            history.push(Message::new(Role::System, system));
        }
        history.extend(self.log.transcript().iter().cloned());

        tracing::debug!("Sending {} messages to {}", history.len(), self.model);
        completion_content(
            &history,
            &self.api_base_url,
            &self.api_key,
            &self.model,
            self.temperature,
        )
        .await
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }

    pub fn log(&self) -> &ChatLog {
        &self.log
    }

    /// The cached title, if one has been generated yet
    pub fn cached_title(&self) -> Option<&str> {
        self.title.as_ref().map(|t| t.title.as_str())
    }

    /// Title for the current time of day
    pub async fn title(&mut self) -> String {
        self.title_for(TimeOfDay::now()).await
    }

    /// Title for `time_of_day`, only asking the model again once the
    /// time block changes.
    pub async fn title_for(&mut self, time_of_day: TimeOfDay) -> String {
        if let Some(cached) = &self.title
            && cached.time_of_day == time_of_day
        {
            return cached.title.clone();
        }

        let title = generate_title(
            time_of_day,
            &self.api_base_url,
            &self.api_key,
            &self.model,
            self.temperature,
        )
        .await;
        self.title = Some(CachedTitle {
            time_of_day,
            title: title.clone(),
        });
        title
    }
}

pub struct ChatBuilder {
    api_base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    system_message: Option<String>,
    max_images: usize,
    log: ChatLog,
}

impl ChatBuilder {
    pub fn new(api_base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            api_base_url: api_base_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature: 0.4,
            system_message: None,
            max_images: 4,
            log: ChatLog::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let builder = Self::new(&config.base_url, &config.api_key, &config.model_name)
            .temperature(config.temperature)
            .max_images(config.max_images);
        match &config.system_message {
            Some(msg) => builder.system_message(msg),
            None => builder,
        }
    }

    pub fn build(self) -> Chat {
        Chat {
            api_base_url: self.api_base_url,
            api_key: self.api_key,
            model: self.model,
            temperature: self.temperature,
            system_message: self.system_message,
            max_images: self.max_images,
            log: self.log,
            title: None,
        }
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn system_message(mut self, msg: &str) -> Self {
        self.system_message = Some(msg.to_string());
        self
    }

    pub fn max_images(mut self, max_images: usize) -> Self {
        self.max_images = max_images;
        self
    }

    pub fn log(mut self, log: ChatLog) -> Self {
        self.log = log;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::notice::ErrorNotice;
    use crate::openai::MessageContent;
    use mockito::Matcher;

    const REPLY: &str = r#"{
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1694268190,
        "model": "gpt-4",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": "Hello! How can I help you today?"
            },
            "finish_reason": "stop"
        }]
    }"#;

    #[test]
    fn test_builder_new() {
        let chat = ChatBuilder::new("https://api.example.com", "test-key", "gpt-4").build();

        assert_eq!(chat.api_base_url, "https://api.example.com");
        assert_eq!(chat.api_key, "test-key");
        assert_eq!(chat.model, "gpt-4");
        assert_eq!(chat.temperature, 0.4);
        assert_eq!(chat.max_images, 4);
        assert!(chat.system_message.is_none());
        assert!(chat.log.is_empty());
        assert!(chat.cached_title().is_none());
    }

    #[test]
    fn test_builder_from_config() {
        let config = AppConfig {
            model_name: "gpt-4".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://api.example.com".to_string(),
            temperature: 0.7,
            system_message: Some("Be brief.".to_string()),
            max_images: 2,
            max_upload_bytes: 1024,
        };
        let chat = ChatBuilder::from_config(&config).build();

        assert_eq!(chat.model, "gpt-4");
        assert_eq!(chat.temperature, 0.7);
        assert_eq!(chat.max_images, 2);
        assert_eq!(chat.system_message.as_deref(), Some("Be brief."));
    }

    #[tokio::test]
    async fn test_chat_basic_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(REPLY)
            .create_async()
            .await;

        let mut chat = ChatBuilder::new(&server.url(), "test-key", "gpt-4").build();
        let reply = chat.next_msg(UserInput::text("Hi")).await.unwrap();

        assert_eq!(reply.as_deref(), Some("Hello! How can I help you today?"));
        assert_eq!(chat.log().len(), 2);
        assert_eq!(chat.log().transcript().len(), 2);

        let user_msg = &chat.log().transcript().messages()[0];
        assert_eq!(
            user_msg.content,
            MessageContent::Parts(vec![ContentPart::text("Hi")])
        );
    }

    #[tokio::test]
    async fn test_chat_empty_input_is_ignored() {
        let server = mockito::Server::new_async().await;
        let mut chat = ChatBuilder::new(&server.url(), "test-key", "gpt-4").build();

        let reply = chat.next_msg(UserInput::new(Some(""), vec![])).await.unwrap();
        assert!(reply.is_none());
        assert!(chat.log().is_empty());
    }

    #[tokio::test]
    async fn test_chat_sends_images_as_data_urls() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex(
                r#""image_url":\{"url":"data:image/jpeg;base64,"#.into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(REPLY)
            .create_async()
            .await;

        let images = (0..6)
            .map(|i| ImageAttachment::new(&format!("{i}.jpg"), Some("image/jpeg"), vec![i]))
            .collect();
        let mut chat = ChatBuilder::new(&server.url(), "test-key", "gpt-4").build();
        chat.next_msg(UserInput::new(None, images)).await.unwrap();

        mock.assert_async().await;

        // Only the first four images are kept
        let user = &chat.log().render_messages()[0];
        assert_eq!(user.content, "");
        assert_eq!(user.images.len(), 4);
        match &chat.log().transcript().messages()[0].content {
            MessageContent::Parts(parts) => assert_eq!(parts.len(), 4),
            other => panic!("Expected parts, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chat_includes_system_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex(
                r#""messages":\[\{"role":"system","content":"Be brief\."\},\{"role":"user""#.into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(REPLY)
            .create_async()
            .await;

        let mut chat = ChatBuilder::new(&server.url(), "test-key", "gpt-4")
            .system_message("Be brief.")
            .build();
        chat.next_msg(UserInput::text("Hi")).await.unwrap();

        mock.assert_async().await;
        // The system message is never part of the session logs
        assert_eq!(chat.log().transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_chat_failure_rolls_back_both_logs() {
        let mut server = mockito::Server::new_async().await;
        let _limited = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":{"message":"Rate limit exceeded: free-models-per-day","code":429}}"#)
            .create_async()
            .await;

        let mut log = ChatLog::new();
        log.push_user(
            RenderMessage::user("Hi", vec![]),
            Message::new_with_parts(Role::User, vec![ContentPart::text("Hi")]),
        );
        log.push_assistant("Hello!");

        let mut chat = ChatBuilder::new(&server.url(), "test-key", "gpt-4")
            .log(log)
            .build();
        let err = chat
            .next_msg(UserInput::text("Tell me more"))
            .await
            .unwrap_err();

        assert_eq!(ErrorNotice::classify(&err), ErrorNotice::RateLimit);
        assert_eq!(chat.log().len(), 2);
        assert_eq!(chat.log().transcript().len(), 2);
        assert_eq!(
            chat.log().render_messages()[1],
            RenderMessage::assistant("Hello!")
        );
    }

    #[tokio::test]
    async fn test_chat_connection_failure_rolls_back() {
        // Nothing listens on this port. The path looks like a 400 status
        // but must not change how the failure is reported.
        let mut chat =
            ChatBuilder::new("http://127.0.0.1:9/4000/v1", "test-key", "gpt-4").build();
        let err = chat.next_msg(UserInput::text("Hi")).await.unwrap_err();

        assert_eq!(ErrorNotice::classify(&err), ErrorNotice::Connection);
        assert!(chat.log().is_empty());
        assert!(chat.log().transcript().is_empty());
    }

    #[tokio::test]
    async fn test_chat_clear() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(REPLY)
            .create_async()
            .await;

        let mut chat = ChatBuilder::new(&server.url(), "test-key", "gpt-4").build();
        chat.next_msg(UserInput::text("Hi")).await.unwrap();
        chat.clear();

        assert!(chat.log().is_empty());
        assert!(chat.log().transcript().is_empty());
    }

    #[tokio::test]
    async fn test_title_is_cached_per_time_block() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Coffee ready?"}}]}"#)
            .expect(2)
            .create_async()
            .await;

        let mut chat = ChatBuilder::new(&server.url(), "test-key", "gpt-4").build();
        assert_eq!(chat.title_for(TimeOfDay::Morning).await, "Coffee ready?");
        assert_eq!(chat.title_for(TimeOfDay::Morning).await, "Coffee ready?");
        assert_eq!(chat.title_for(TimeOfDay::Evening).await, "Coffee ready?");

        mock.assert_async().await;
        assert_eq!(chat.cached_title(), Some("Coffee ready?"));
    }
}
