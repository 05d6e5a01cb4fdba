use std::time::Duration;

use anyhow::{Error, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

// Object {
//     "type": String("image_url"),
//     "image_url": Object {
//         "url": String("data:image/png;base64,iVBORw0KGgo...")
//     }
// }
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: &str) -> Self {
        ContentPart::Text {
            text: text.to_string(),
        }
    }

    pub fn image_url(url: &str) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: url.to_string(),
            },
        }
    }
}

/// Message content is either a plain string or, for multimodal
/// messages, a list of text and image parts.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: MessageContent::Text(content.to_string()),
        }
    }

    pub fn new_with_parts(role: Role, parts: Vec<ContentPart>) -> Self {
        Message {
            role,
            content: MessageContent::Parts(parts),
        }
    }
}

fn completions_url(api_base_url: &str) -> String {
    format!("{}/chat/completions", api_base_url.trim_end_matches('/'))
}

/// Send the transcript to an OpenAI compatible chat completion
/// endpoint and return the raw JSON response.
///
/// Any non-success status is an error that includes the status code
/// and response body so callers can tell rate limits from auth
/// failures.
pub async fn completion(
    messages: &[Message],
    api_base_url: &str,
    api_key: &str,
    model: &str,
    temperature: f64,
) -> Result<Value, Error> {
    let payload = json!({
        "model": model,
        "messages": messages,
        "temperature": temperature,
    });
    let response = reqwest::Client::new()
        .post(completions_url(api_base_url))
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(60 * 5))
        .json(&payload)
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!("Chat completion failed with status {}: {}", status, body);
        bail!("Chat completion failed with status {}: {}", status, body);
    }

    Ok(response.json().await.map_err(transport_error)?)
}

// The request URL can contain digits that look like status codes to
// `ErrorNotice::classify`, so it is left out of transport errors
fn transport_error(err: reqwest::Error) -> Error {
    tracing::error!("Chat completion request failed: {}", err);
    anyhow!("Connection error: {}", err.without_url())
}

/// Like `completion` but returns only the assistant's reply text.
pub async fn completion_content(
    messages: &[Message],
    api_base_url: &str,
    api_key: &str,
    model: &str,
    temperature: f64,
) -> Result<String, Error> {
    let resp = completion(messages, api_base_url, api_key, model, temperature).await?;
    extract_content(&resp)
}

fn extract_content(resp: &Value) -> Result<String, Error> {
    // Some providers return an error object with a 200 status
    if let Some(err) = resp.get("error") {
        bail!("Chat completion returned an error: {}", err);
    }
    match &resp["choices"][0]["message"]["content"] {
        Value::String(s) => Ok(s.to_owned()),
        Value::Null => Err(anyhow!("No message received. Resp:\n\n {}", resp)),
        other => Ok(other.to_string()),
    }
}
