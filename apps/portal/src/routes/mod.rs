pub mod admin;
pub mod auth;
pub mod health;
pub mod profile;
pub mod public;
pub mod recruiter;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::resume::MAX_RESUME_BYTES;
use crate::screens;
use crate::session::{require_admin, require_recruiter, require_user};
use crate::state::AppState;
use crate::wizard::handlers;

/// Room for the multipart framing around a maximum-size resume, so an
/// oversized file is reported by the resume check rather than cut off mid-read.
const RESUME_BODY_LIMIT: usize = MAX_RESUME_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(public::handle_home))
        .route("/jobs", get(public::handle_list_jobs))
        .route("/jobs/:id", get(public::handle_job_detail))
        .route("/policies/:slug", get(public::handle_policy))
        .route("/auth/:role/login", post(auth::handle_login))
        .route("/auth/logout", post(auth::handle_logout));

    let applicant = Router::new()
        .route(
            "/me/profile",
            get(profile::handle_get_profile).put(profile::handle_update_profile),
        )
        .route(
            "/me/resume",
            post(profile::handle_upload_resume).layer(DefaultBodyLimit::max(RESUME_BODY_LIMIT)),
        )
        // Application wizard
        .route("/jobs/:id/apply", post(handlers::handle_start))
        .route(
            "/wizard",
            get(handlers::handle_get).delete(handlers::handle_leave),
        )
        .route("/wizard/advance", post(handlers::handle_advance))
        .route("/wizard/retreat", post(handlers::handle_retreat))
        .route("/wizard/jump/:index", post(handlers::handle_jump))
        .route("/wizard/fields", patch(handlers::handle_update_field))
        .route(
            "/wizard/levels/:level",
            post(handlers::handle_select_level).delete(handlers::handle_deselect_level),
        )
        .route("/wizard/experience", post(handlers::handle_add_experience))
        .route(
            "/wizard/experience/:index",
            delete(handlers::handle_remove_experience),
        )
        .route("/wizard/languages", post(handlers::handle_add_language))
        .route(
            "/wizard/languages/:index",
            delete(handlers::handle_remove_language),
        )
        .route("/wizard/skills", post(handlers::handle_add_skill))
        .route("/wizard/skills/:index", delete(handlers::handle_remove_skill))
        .route("/wizard/submit", post(handlers::handle_submit))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    let recruiter = Router::new()
        .route(
            "/recruiter/jobs",
            get(recruiter::handle_list_jobs).post(recruiter::handle_create_job),
        )
        .route(
            "/recruiter/jobs/:id",
            put(recruiter::handle_update_job).delete(recruiter::handle_delete_job),
        )
        .route(
            "/recruiter/jobs/:id/applicants",
            get(recruiter::handle_job_applicants),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_recruiter,
        ));

    let admin = Router::new()
        .route("/admin/jobs", get(admin::handle_jobs))
        .route("/admin/applicants", get(admin::handle_applicants))
        .route("/admin/companies", get(admin::handle_companies))
        .route(
            "/admin/jobs/:id/objection",
            post(admin::handle_raise_objection),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    public
        .merge(applicant)
        .merge(recruiter)
        .merge(admin)
        .fallback(screens::not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::config::Config;
    use crate::session::SESSION_COOKIE;
    use crate::store::PortalStore;
    use crate::wizard::tests::filled_form;

    fn app(backend: Arc<FakeBackend>) -> Router {
        let state = AppState {
            backend,
            store: Arc::new(PortalStore::new()),
            config: Config {
                backend_url: "http://backend.test".to_string(),
                backend_timeout_secs: 5,
                redirect_countdown_secs: 5,
                port: 0,
                rust_log: "debug".to_string(),
            },
        };
        build_router(state)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    /// Logs in and returns the `name=value` pair to send back as a cookie.
    async fn login(app: &Router, role: &str) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/auth/{role}/login"),
                None,
                json!({ "email": "asha@example.com", "password": "secret" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        set_cookie.split(';').next().unwrap().to_string()
    }

    fn resume_request(cookie: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--XBOUNDARY\r\n\
                 Content-Disposition: form-data; name=\"resume\"; filename=\"cv.pdf\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n--XBOUNDARY--\r\n");
        Request::builder()
            .method("POST")
            .uri("/me/resume")
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Arc::default())
            .oneshot(empty_request("GET", "/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["service"], "portal");
    }

    #[tokio::test]
    async fn test_unknown_path_shows_countdown_screen() {
        let response = app(Arc::default())
            .oneshot(empty_request("GET", "/no/such/page", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get(header::REFRESH).unwrap(), "5; url=/");
        let body = body_json(response).await;
        assert_eq!(body["screen"]["redirect_to"], "/");
    }

    #[tokio::test]
    async fn test_guarded_route_without_session_is_unauthorized() {
        let response = app(Arc::default())
            .oneshot(empty_request("GET", "/wizard", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::REFRESH));
    }

    #[tokio::test]
    async fn test_wrong_role_is_forbidden() {
        let app = app(Arc::default());
        let cookie = login(&app, "user").await;
        let response = app
            .clone()
            .oneshot(empty_request("GET", "/admin/jobs", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let cookie = login(&app, "admin").await;
        let response = app
            .oneshot(empty_request("GET", "/admin/jobs", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_sets_session_cookie() {
        let app = app(Arc::default());
        let cookie = login(&app, "recruiter").await;
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=")));

        let response = app
            .oneshot(empty_request("GET", "/recruiter/jobs", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_failed_login_surfaces_backend_message() {
        let response = app(Arc::default())
            .oneshot(json_request(
                "POST",
                "/auth/user/login",
                None,
                json!({ "email": "asha@example.com", "password": "wrong" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = body_json(response).await;
        assert_eq!(body["notice"]["message"], "Invalid email or password");
    }

    #[tokio::test]
    async fn test_logout_drops_session() {
        let app = app(Arc::default());
        let cookie = login(&app, "user").await;
        let response = app
            .clone()
            .oneshot(empty_request("POST", "/auth/logout", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(empty_request("GET", "/me/profile", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_pdf_resume_never_reaches_backend() {
        let backend = Arc::new(FakeBackend::default());
        let app = app(backend.clone());
        let cookie = login(&app, "user").await;

        let response = app
            .clone()
            .oneshot(resume_request(&cookie, "image/png", b"\x89PNG"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(backend.uploads.load(Ordering::SeqCst), 0);

        let response = app
            .oneshot(resume_request(&cookie, "application/pdf", b"%PDF-1.7"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(backend.uploads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_oversized_resume_never_reaches_backend() {
        let backend = Arc::new(FakeBackend::default());
        let app = app(backend.clone());
        let cookie = login(&app, "user").await;

        let bytes = vec![b'%'; MAX_RESUME_BYTES + 1];
        let response = app
            .oneshot(resume_request(&cookie, "application/pdf", &bytes))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(backend.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_posting_never_reaches_backend() {
        let backend = Arc::new(FakeBackend::default());
        let app = app(backend.clone());
        let cookie = login(&app, "recruiter").await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/recruiter/jobs",
                Some(&cookie),
                json!({
                    "title": "",
                    "company": "Acme",
                    "location": "Pune",
                    "description": "x",
                    "openings": 1
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(backend.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_apply_to_missing_job() {
        let app = app(Arc::default());
        let cookie = login(&app, "user").await;
        let response = app
            .oneshot(empty_request("POST", "/jobs/job-404/apply", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wizard_flow() {
        let backend = Arc::new(FakeBackend::default());
        let app = app(backend.clone());
        let cookie = login(&app, "user").await;

        let response = app
            .clone()
            .oneshot(empty_request("POST", "/jobs/job-1/apply", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["wizard"]["job_id"], "job-1");
        assert_eq!(body["wizard"]["step_index"], 0);

        // Empty personal details block the first page.
        let response = app
            .clone()
            .oneshot(empty_request("POST", "/wizard/advance", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(
            body["error"]["message"],
            "Please enter Full Name for Personal Details"
        );

        // UG needs 12th first.
        let response = app
            .clone()
            .oneshot(empty_request("POST", "/wizard/levels/UG", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let message = body_json(response).await["error"]["message"].clone();
        assert!(message.as_str().unwrap().contains("12th"));

        for level in ["12th", "UG"] {
            let response = app
                .clone()
                .oneshot(empty_request(
                    "POST",
                    &format!("/wizard/levels/{level}"),
                    Some(&cookie),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", "/wizard/levels/12th", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let message = body_json(response).await["error"]["message"].clone();
        assert!(message.as_str().unwrap().contains("UG"));

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                "/wizard/fields",
                Some(&cookie),
                json!({ "section": "personal", "field": "full_name", "value": "Asha Rao" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Submitting an incomplete application is stopped locally.
        let response = app
            .clone()
            .oneshot(empty_request("POST", "/wizard/submit", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(backend.submissions.load(Ordering::SeqCst), 0);

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", "/wizard", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(empty_request("GET", "/wizard", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    async fn open_filled_wizard(app: &Router, cookie: &str) {
        let response = app
            .clone()
            .oneshot(empty_request("POST", "/jobs/job-1/apply", Some(cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_accepted_submit_discards_wizard() {
        let backend = Arc::new(FakeBackend::with_profile(&filled_form()));
        let app = app(backend.clone());
        let cookie = login(&app, "user").await;
        open_filled_wizard(&app, &cookie).await;

        let response = app
            .clone()
            .oneshot(empty_request("POST", "/wizard/submit", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["notice"]["message"], "Application submitted successfully");
        assert_eq!(backend.submissions.load(Ordering::SeqCst), 1);

        let response = app
            .oneshot(empty_request("GET", "/wizard", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rejected_submit_keeps_form_for_retry() {
        let backend = FakeBackend::with_profile(&filled_form());
        backend.reject_submissions.store(409, Ordering::SeqCst);
        let backend = Arc::new(backend);
        let app = app(backend.clone());
        let cookie = login(&app, "user").await;
        open_filled_wizard(&app, &cookie).await;

        let response = app
            .clone()
            .oneshot(empty_request("POST", "/wizard/submit", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["notice"]["message"], "You have already applied to this job");

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/wizard", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["wizard"]["job_id"], "job-1");
        assert_eq!(body["wizard"]["submission"], "error");
        assert_eq!(body["wizard"]["content"]["details"]["full_name"], "Asha Rao");

        // The error status does not block another attempt.
        backend.reject_submissions.store(0, Ordering::SeqCst);
        let response = app
            .oneshot(empty_request("POST", "/wizard/submit", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(backend.submissions.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_backend_token_signs_out() {
        let backend = Arc::new(FakeBackend::default());
        let app = app(backend.clone());
        let cookie = login(&app, "user").await;

        backend.token_expired.store(true, Ordering::SeqCst);
        let response = app
            .clone()
            .oneshot(empty_request("GET", "/me/profile", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(header::REFRESH).unwrap(), "5; url=/");
        let set_cookie = response.headers().get(header::SET_COOKIE).unwrap();
        assert!(set_cookie.to_str().unwrap().contains("Max-Age=0"));
        let body = body_json(response).await;
        assert!(body["screen"].is_object());

        // The portal session is gone even once the backend recovers.
        backend.token_expired.store(false, Ordering::SeqCst);
        let response = app
            .oneshot(empty_request("GET", "/me/profile", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_unknown_policy_is_not_found() {
        let app = app(Arc::default());
        let response = app
            .clone()
            .oneshot(empty_request("GET", "/policies/refund", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(empty_request("GET", "/policies/cookies", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
