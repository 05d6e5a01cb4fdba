//! Server side rendering of the chat page. Handlebars escapes every
//! `{{value}}` so model output and user text are safe to embed.
use anyhow::Result;
use handlebars::Handlebars;

use super::public::ChatPage;

const CHAT_PAGE: &str = include_str!("../../../../web-ui/templates/index.hbs");
const CHAT_PAGE_NAME: &str = "chat_page";

fn templates<'a>() -> Result<Handlebars<'a>> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_template_string(CHAT_PAGE_NAME, CHAT_PAGE)?;
    Ok(registry)
}

pub fn render_chat_page(page: &ChatPage) -> Result<String> {
    Ok(templates()?.render(CHAT_PAGE_NAME, page)?)
}
