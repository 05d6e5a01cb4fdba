//! Router for the session API

use std::sync::{Arc, RwLock};

use axum::{Json, Router, extract::State, routing::get};
use axum_extra::extract::CookieJar;

use super::public;
use crate::ai::chat::RenderMessageView;
use crate::ai::notice::NoticeView;
use crate::api::public::ApiError;
use crate::api::session::{RequestSession, session_for};
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// Get the current session's conversation as it is displayed. Unlike
/// the page this doesn't consume a pending notice.
async fn session_view(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<public::SessionResponse>), ApiError> {
    let RequestSession { jar, session, .. } = session_for(&state, jar)?;
    let session = session.lock().await;

    let resp = public::SessionResponse {
        title: session.chat.cached_title().map(str::to_string),
        messages: session
            .chat
            .log()
            .render_messages()
            .iter()
            .map(RenderMessageView::from)
            .collect(),
        notice: session.notice.map(NoticeView::from),
    };

    Ok((jar, Json(resp)))
}

/// Create the session router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(session_view))
}
