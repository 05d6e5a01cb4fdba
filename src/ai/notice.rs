//! User facing notices for failed model calls.
//!
//! Failures are classified by looking for status codes and well known
//! phrases in the error text. Provider errors are not consistent
//! enough to do much better than that.
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorNotice {
    RateLimit,
    Auth,
    BadRequest,
    Connection,
}

const RATE_LIMIT_HELP: &str = "You've hit the daily free model limit.

Options to continue:
- Add credits to your OpenRouter account for unlimited access
- Wait until tomorrow for the limit to reset
- Try switching to a different model in your settings";

impl ErrorNotice {
    pub fn classify(error: &anyhow::Error) -> Self {
        // Alternate formatting includes the whole context chain
        Self::classify_str(&format!("{:#}", error))
    }

    pub fn classify_str(error: &str) -> Self {
        if error.contains("429") || error.contains("Rate limit exceeded") {
            ErrorNotice::RateLimit
        } else if error.contains("401") || error.to_lowercase().contains("authentication") {
            ErrorNotice::Auth
        } else if error.contains("400") {
            ErrorNotice::BadRequest
        } else {
            ErrorNotice::Connection
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            ErrorNotice::RateLimit => "🚫 Rate Limit Reached",
            ErrorNotice::Auth => "🔑 Authentication Error",
            ErrorNotice::BadRequest => "❌ Bad Request",
            ErrorNotice::Connection => "⚠️ Connection Error",
        }
    }

    pub fn help(&self) -> &'static str {
        match self {
            ErrorNotice::RateLimit => RATE_LIMIT_HELP,
            ErrorNotice::Auth => "Please check your API key in the app settings.",
            ErrorNotice::BadRequest => {
                "There was an issue with your request. Please try again."
            }
            ErrorNotice::Connection => {
                "Unable to connect to the AI service. Please check your internet connection and try again."
            }
        }
    }
}

/// Serializable notice for templates and JSON responses
#[derive(Clone, Debug, Serialize)]
pub struct NoticeView {
    pub kind: ErrorNotice,
    pub heading: &'static str,
    pub help: &'static str,
}

impl From<ErrorNotice> for NoticeView {
    fn from(notice: ErrorNotice) -> Self {
        Self {
            kind: notice,
            heading: notice.heading(),
            help: notice.help(),
        }
    }
}
