//! Greeting titles that change with the time of day.
use std::fmt;

use chrono::{Local, Timelike};

use crate::ai::prompt::chat_title_prompt;
use crate::openai::{Message, Role, completion_content};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn now() -> Self {
        Self::from_hour(Local::now().hour())
    }

    /// Title used when the model can't come up with one
    pub fn fallback_title(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "What's on your agenda?",
            TimeOfDay::Afternoon => "How's it going so far?",
            TimeOfDay::Evening => "Ready to unwind?",
            TimeOfDay::Night => "Can't sleep either?",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        };
        write!(f, "{}", s)
    }
}

fn clean_title(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim_matches('\'')
}

/// Ask the model for a title that fits `time_of_day`. Never fails,
/// any error or empty response falls back to a fixed title.
pub async fn generate_title(
    time_of_day: TimeOfDay,
    api_base_url: &str,
    api_key: &str,
    model: &str,
    temperature: f64,
) -> String {
    let prompt = match chat_title_prompt(&time_of_day.to_string()) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Failed to render title prompt: {}", e);
            return time_of_day.fallback_title().to_string();
        }
    };
    let messages = vec![Message::new(Role::User, &prompt)];

    match completion_content(&messages, api_base_url, api_key, model, temperature).await {
        Ok(raw) => {
            let title = clean_title(&raw);
            if title.is_empty() {
                time_of_day.fallback_title().to_string()
            } else {
                title.to_string()
            }
        }
        Err(e) => {
            tracing::warn!("Title generation failed, using fallback: {}", e);
            time_of_day.fallback_title().to_string()
        }
    }
}

/// A title remembered together with the time block it was made for
#[derive(Clone, Debug, PartialEq)]
pub struct CachedTitle {
    pub time_of_day: TimeOfDay,
    pub title: String,
}
