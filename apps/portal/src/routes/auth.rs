use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::models::Credentials;
use crate::errors::AppError;
use crate::notice::Notice;
use crate::session::{clear_session_cookie, session_cookie, session_id_from_headers, Role, Session};
use crate::state::AppState;
use crate::wizard::validation::require;

#[derive(Serialize)]
pub struct LoginResponse {
    pub role: Role,
    pub display_name: String,
    pub redirect_to: &'static str,
    pub notice: Notice,
}

/// Landing route after a successful login.
pub fn home_for(role: Role) -> &'static str {
    match role {
        Role::User => "/",
        Role::Recruiter => "/recruiter/jobs",
        Role::Admin => "/admin/jobs",
    }
}

/// POST /auth/:role/login
pub async fn handle_login(
    State(state): State<AppState>,
    Path(role): Path<Role>,
    Json(credentials): Json<Credentials>,
) -> Result<Response, AppError> {
    require("Login", "Email", &credentials.email)?;
    require("Login", "Password", &credentials.password)?;

    let auth = state.backend.login(role, &credentials).await?;
    let session = Session {
        id: Uuid::new_v4(),
        role,
        token: auth.token,
        display_name: auth.display_name,
    };
    info!("Session {} logged in as {}", session.id, role.as_str());

    let cookie = session_cookie(session.id);
    let body = LoginResponse {
        role,
        display_name: session.display_name.clone(),
        redirect_to: home_for(role),
        notice: Notice::success("Logged in successfully"),
    };
    state.store.insert_session(session).await;

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// POST /auth/logout
///
/// The local session is dropped even if the backend call fails; the browser
/// has asked to be logged out.
pub async fn handle_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = match session_id_from_headers(&headers) {
        Some(id) => state.store.remove_session(id).await,
        None => None,
    };
    if let Some(session) = session {
        if let Err(e) = state.backend.logout(&session.token).await {
            warn!("Backend logout failed for session {}: {e}", session.id);
        }
        info!("Session {} logged out", session.id);
    }

    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(serde_json::json!({
            "redirect_to": crate::screens::HOME_ROUTE,
            "notice": Notice::success("Logged out"),
        })),
    )
        .into_response()
}
