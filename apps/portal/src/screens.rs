use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::state::AppState;

pub const HOME_ROUTE: &str = "/";

/// A full-page message that sends the browser home after a countdown.
#[derive(Debug, Clone, Serialize)]
pub struct CountdownScreen {
    #[serde(skip)]
    pub status: StatusCode,
    pub title: &'static str,
    pub message: &'static str,
    pub redirect_to: &'static str,
    pub redirect_after_secs: u64,
}

impl CountdownScreen {
    pub fn unauthorized(status: StatusCode, secs: u64) -> Self {
        Self {
            status,
            title: "Unauthorized",
            message: "You are not allowed to view this page. Redirecting you to the home page.",
            redirect_to: HOME_ROUTE,
            redirect_after_secs: secs,
        }
    }

    pub fn not_found(secs: u64) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            title: "Page not found",
            message: "The page you are looking for does not exist. \
                      Redirecting you to the home page.",
            redirect_to: HOME_ROUTE,
            redirect_after_secs: secs,
        }
    }
}

impl IntoResponse for CountdownScreen {
    fn into_response(self) -> Response {
        let refresh = format!("{}; url={}", self.redirect_after_secs, self.redirect_to);
        (
            self.status,
            [(header::REFRESH, refresh)],
            Json(serde_json::json!({ "screen": self })),
        )
            .into_response()
    }
}

/// Router fallback for unknown paths.
pub async fn not_found(State(state): State<AppState>) -> CountdownScreen {
    CountdownScreen::not_found(state.config.redirect_countdown_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_sets_refresh_header() {
        let response = CountdownScreen::not_found(5).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::REFRESH).unwrap(),
            "5; url=/"
        );
    }

    #[test]
    fn test_unauthorized_keeps_given_status() {
        let response = CountdownScreen::unauthorized(StatusCode::FORBIDDEN, 3).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers().get(header::REFRESH).unwrap(),
            "3; url=/"
        );
    }
}
