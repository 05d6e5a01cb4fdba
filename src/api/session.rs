//! Cookie backed browser sessions.
use std::sync::{Arc, RwLock};

use anyhow::{Result, anyhow};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::api::state::{AppState, SharedSession};

pub const SESSION_COOKIE: &str = "chatbot_session";

/// The session a request belongs to
pub struct RequestSession {
    /// Cookie jar to send back so new sessions stick
    pub jar: CookieJar,
    pub session: SharedSession,
    /// The request had no usable session cookie
    pub is_new: bool,
}

/// Resolve the session for a request
pub fn session_for(state: &Arc<RwLock<AppState>>, jar: CookieJar) -> Result<RequestSession> {
    let requested = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let (id, session) = state
        .write()
        .map_err(|_| anyhow!("Unable to write shared state"))?
        .session(requested.as_deref());

    if requested.as_deref() == Some(id.as_str()) {
        return Ok(RequestSession {
            jar,
            session,
            is_new: false,
        });
    }

    let cookie = Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok(RequestSession {
        jar: jar.add(cookie),
        session,
        is_new: true,
    })
}
