//! Router for the chat page

use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use axum::{
    Router,
    extract::{Multipart, State, multipart::MultipartError},
    response::{Html, Redirect},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;

use super::page::render_chat_page;
use super::public;
use crate::ai::attachments::{ImageAttachment, is_accepted, mime_from_name};
use crate::ai::chat::{RenderMessageView, UserInput};
use crate::ai::notice::{ErrorNotice, NoticeView};
use crate::ai::title::TimeOfDay;
use crate::api::public::ApiError;
use crate::api::session::{RequestSession, session_for};
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// Render the chat page for the current session
async fn chat_page(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), ApiError> {
    let max_images = state
        .read()
        .map_err(|_| anyhow!("Unable to read shared state"))?
        .config
        .max_images;
    let RequestSession {
        jar,
        session,
        is_new,
    } = session_for(&state, jar)?;
    let mut session = session.lock().await;

    // Requests without a session cookie (crawlers, health checks) don't
    // get to spend a model call on the title
    let title = if is_new {
        TimeOfDay::now().fallback_title().to_string()
    } else {
        session.chat.title().await
    };
    let notice = session.notice.take().map(NoticeView::from);
    let messages = session
        .chat
        .log()
        .render_messages()
        .iter()
        .map(RenderMessageView::from)
        .collect();

    let page = public::ChatPage::new(title, messages, notice, max_images);
    Ok((jar, Html(render_chat_page(&page)?)))
}

/// Collect the text and accepted images from the chat form
async fn read_input(mut multipart: Multipart) -> Result<UserInput, MultipartError> {
    let mut input = UserInput::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("text") => {
                input.text = Some(field.text().await?);
            }
            Some("files") => {
                let name = field.file_name().unwrap_or_default().to_string();
                // Browsers often send application/octet-stream so
                // prefer what the file name says
                let mime = mime_from_name(&name)
                    .map(str::to_string)
                    .or_else(|| field.content_type().map(str::to_string));
                let data = field.bytes().await?;

                // An empty file input still submits one empty part
                if name.is_empty() && data.is_empty() {
                    continue;
                }
                if !is_accepted(&name, mime.as_deref()) {
                    tracing::warn!("Skipping unsupported upload {} ({:?})", name, mime);
                    continue;
                }
                input
                    .images
                    .push(ImageAttachment::new(&name, mime.as_deref(), data.to_vec()));
            }
            other => {
                tracing::debug!("Ignoring unknown form field {:?}", other);
            }
        }
    }

    Ok(input)
}

/// Run one chat turn and go back to the page
async fn chat_submit(
    State(state): State<SharedState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<(CookieJar, Redirect), ApiError> {
    let RequestSession { jar, session, .. } = session_for(&state, jar)?;
    let input = read_input(multipart).await;
    let mut session = session.lock().await;

    // Oversized or malformed uploads are reported like a bad request
    // from the model
    let input = match input {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!("Unable to read chat form: {:#}", e);
            session.notice = Some(ErrorNotice::BadRequest);
            return Ok((jar, Redirect::to("/")));
        }
    };

    match session.chat.next_msg(input).await {
        Ok(_) => {
            session.notice = None;
        }
        Err(e) => {
            let notice = ErrorNotice::classify(&e);
            tracing::warn!("Showing {:?} notice for failed turn", notice);
            session.notice = Some(notice);
        }
    }

    Ok((jar, Redirect::to("/")))
}

/// Clear the conversation
async fn chat_clear(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    let RequestSession { jar, session, .. } = session_for(&state, jar)?;
    let mut session = session.lock().await;
    session.chat.clear();
    session.notice = None;

    Ok((jar, Redirect::to("/")))
}

/// Create the chat page router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(chat_page))
        .route("/chat", post(chat_submit))
        .route("/clear", post(chat_clear))
}
