//! Portal sessions, the session cookie, and the per-role route guards.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::screens::CountdownScreen;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "portal_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Recruiter,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Recruiter => "recruiter",
            Role::Admin => "admin",
        }
    }
}

/// A logged-in browser. `token` is the backend's session credential and is
/// never sent back to the browser.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub role: Role,
    pub token: String,
    pub display_name: String,
}

/// Reads the portal session id from the request's `Cookie` headers.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

pub fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

pub async fn require_user(State(state): State<AppState>, req: Request, next: Next) -> Response {
    guard(&state, Role::User, req, next).await
}

pub async fn require_recruiter(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    guard(&state, Role::Recruiter, req, next).await
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    guard(&state, Role::Admin, req, next).await
}

/// Lets the request through with its `Session` in the extensions, or answers
/// with the unauthorized screen. A 401 from downstream means the backend no
/// longer honours the session's token, so the session is dropped as well.
async fn guard(state: &AppState, role: Role, mut req: Request, next: Next) -> Response {
    let session = match session_id_from_headers(req.headers()) {
        Some(id) => state.store.session(id).await,
        None => None,
    };
    let secs = state.config.redirect_countdown_secs;

    match session {
        None => {
            debug!("No session for {} {}", req.method(), req.uri().path());
            CountdownScreen::unauthorized(StatusCode::UNAUTHORIZED, secs).into_response()
        }
        Some(s) if s.role != role => {
            debug!(
                "Session {} ({}) denied {} route {}",
                s.id,
                s.role.as_str(),
                role.as_str(),
                req.uri().path()
            );
            CountdownScreen::unauthorized(StatusCode::FORBIDDEN, secs).into_response()
        }
        Some(s) => {
            let id = s.id;
            req.extensions_mut().insert(s);
            let response = next.run(req).await;
            if response.status() != StatusCode::UNAUTHORIZED {
                return response;
            }
            state.store.remove_session(id).await;
            info!("Session {id} expired at the backend, signed out");
            (
                [(header::SET_COOKIE, clear_session_cookie())],
                CountdownScreen::unauthorized(StatusCode::UNAUTHORIZED, secs),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_id_from_cookie_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}; lang=en")).unwrap(),
        );
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[test]
    fn test_malformed_session_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("portal_session=not-a-uuid"),
        );
        assert_eq!(session_id_from_headers(&headers), None);
        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_cookie_round_trip() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        let set = session_cookie(id);
        let pair = set.split(';').next().unwrap();
        headers.insert(header::COOKIE, HeaderValue::from_str(pair).unwrap());
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[test]
    fn test_role_path_names() {
        let role: Role = serde_json::from_str(r#""recruiter""#).unwrap();
        assert_eq!(role, Role::Recruiter);
        assert_eq!(Role::Admin.as_str(), "admin");
    }
}
