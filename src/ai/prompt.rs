//! Reusable prompts using Handlebars for templating. Strict mode is
//! on so a missing variable is an error instead of an empty string.

use std::fmt;

use anyhow::Result;
use handlebars::Handlebars;
use serde_json::json;

#[derive(Debug)]
pub enum Prompt {
    ChatTitle,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<Prompt> for String {
    fn from(item: Prompt) -> String {
        format!("{:?}", item)
    }
}

const CHAT_TITLE_PROMPT: &str = r"You write short, friendly chat titles that ASK or ENGAGE.
Rules:
- 2–6 words, casual and welcoming.
- Always ask a question or invite conversation.
- Use proper punctuation (questions, invitations).
- Address one individual directly, not generic.
- Avoid cheesy greetings like “Good morning sunshine.”
- Fit the given time of day naturally.
Return ONLY the title text.
Examples:
Time: morning -> What's on your agenda?
Time: morning -> Coffee ready? Let's chat
Time: afternoon -> How's it going so far?
Time: afternoon -> Need a quick break?
Time: evening -> Ready to unwind?
Time: evening -> What's on your mind?
Time: night -> Can't sleep either?
Time: night -> What's keeping you up?

Time: {{time_of_day}} ->";

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    // Prompts are plain text so nothing should be HTML escaped
    registry.register_escape_fn(handlebars::no_escape);
    registry
        .register_template_string(&Prompt::ChatTitle.to_string(), CHAT_TITLE_PROMPT)
        .expect("Failed to register template");
    registry
}

pub fn chat_title_prompt(time_of_day: &str) -> Result<String> {
    let prompt = templates().render(
        &Prompt::ChatTitle.to_string(),
        &json!({ "time_of_day": time_of_day }),
    )?;
    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_title_prompt() {
        let prompt = chat_title_prompt("evening").unwrap();
        assert!(prompt.starts_with("You write short, friendly chat titles"));
        assert!(prompt.ends_with("Time: evening ->"));
        // Apostrophes in the examples must not be escaped
        assert!(prompt.contains("What's on your agenda?"));
    }
}
