//! Backend client: the portal's only way to reach the job portal REST API.
//!
//! Handlers depend on the `PortalBackend` trait; `HttpBackend` is the real
//! implementation over `reqwest`. Calls are never retried: every failure is
//! reported back to the user, who decides whether to try again.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, COOKIE, SET_COOKIE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod models;

#[cfg(test)]
pub mod fake;

use crate::resume::ResumeUpload;
use crate::session::Role;
use crate::wizard::form::ResumeRef;
use crate::wizard::submission::ApplicationPayload;
use models::{
    ApplicationReceipt, AuthSession, Credentials, JobDetail, JobPosting, JobQuery, JobSummary,
    Objection, Profile,
};

/// Name of the cookie the backend uses for its session token.
pub const BACKEND_TOKEN_COOKIE: &str = "token";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Session expired or missing")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Login succeeded but no session token was returned")]
    MissingToken,
}

#[async_trait]
pub trait PortalBackend: Send + Sync {
    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<JobSummary>, BackendError>;
    async fn job_detail(&self, job_id: &str) -> Result<JobDetail, BackendError>;

    async fn login(
        &self,
        role: Role,
        credentials: &Credentials,
    ) -> Result<AuthSession, BackendError>;
    async fn logout(&self, token: &str) -> Result<(), BackendError>;

    async fn fetch_profile(&self, token: &str) -> Result<Profile, BackendError>;
    async fn update_profile(
        &self,
        token: &str,
        profile: &Profile,
    ) -> Result<Profile, BackendError>;
    async fn upload_resume(
        &self,
        token: &str,
        upload: &ResumeUpload,
    ) -> Result<ResumeRef, BackendError>;
    async fn submit_application(
        &self,
        token: &str,
        job_id: &str,
        payload: &ApplicationPayload,
    ) -> Result<ApplicationReceipt, BackendError>;

    async fn recruiter_jobs(&self, token: &str) -> Result<Value, BackendError>;
    async fn create_job(&self, token: &str, posting: &JobPosting) -> Result<Value, BackendError>;
    async fn update_job(
        &self,
        token: &str,
        job_id: &str,
        posting: &JobPosting,
    ) -> Result<Value, BackendError>;
    async fn delete_job(&self, token: &str, job_id: &str) -> Result<(), BackendError>;
    async fn job_applicants(&self, token: &str, job_id: &str) -> Result<Value, BackendError>;

    async fn admin_jobs(&self, token: &str) -> Result<Value, BackendError>;
    async fn admin_applicants(&self, token: &str) -> Result<Value, BackendError>;
    async fn admin_companies(&self, token: &str) -> Result<Value, BackendError>;
    async fn raise_objection(
        &self,
        token: &str,
        job_id: &str,
        objection: &Objection,
    ) -> Result<Value, BackendError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    name: String,
}

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header(COOKIE, format!("{BACKEND_TOKEN_COOKIE}={token}"))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, body));
        }
        Ok(response.json().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), BackendError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, body));
        }
        Ok(())
    }
}

/// Maps a non-success backend response to a `BackendError`, keeping the
/// backend's own `message` when it sent one.
pub fn error_for_status(status: StatusCode, body: String) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED => BackendError::Unauthorized,
        StatusCode::FORBIDDEN => BackendError::Forbidden,
        StatusCode::NOT_FOUND => BackendError::NotFound(
            backend_message(&body).unwrap_or_else(|| "resource".to_string()),
        ),
        _ => {
            if status.is_server_error() {
                warn!("Backend returned {status}: {body}");
            }
            BackendError::Api {
                status: status.as_u16(),
                message: backend_message(&body).unwrap_or(body),
            }
        }
    }
}

fn backend_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|e| e.message)
        .filter(|m| !m.trim().is_empty())
}

/// Pulls the backend session token out of `Set-Cookie` headers.
pub fn token_from_set_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == BACKEND_TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn login_path(role: Role) -> &'static str {
    match role {
        Role::User => "/user/login",
        Role::Recruiter => "/recruiter/login",
        Role::Admin => "/admin/login",
    }
}

#[async_trait]
impl PortalBackend for HttpBackend {
    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<JobSummary>, BackendError> {
        self.send(self.client.get(self.url("/jobs")).query(query))
            .await
    }

    async fn job_detail(&self, job_id: &str) -> Result<JobDetail, BackendError> {
        self.send(self.client.get(self.url(&format!("/jobs/{job_id}"))))
            .await
    }

    async fn login(
        &self,
        role: Role,
        credentials: &Credentials,
    ) -> Result<AuthSession, BackendError> {
        let response = self
            .client
            .post(self.url(login_path(role)))
            .json(credentials)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, body));
        }

        let cookie_token = token_from_set_cookie(response.headers());
        let body: LoginBody = response.json().await?;
        let token = cookie_token
            .or(body.token)
            .ok_or(BackendError::MissingToken)?;
        debug!("Backend login succeeded for role {role:?}");

        Ok(AuthSession {
            token,
            display_name: body.name,
        })
    }

    async fn logout(&self, token: &str) -> Result<(), BackendError> {
        self.send_empty(self.authed(self.client.post(self.url("/logout")), token))
            .await
    }

    async fn fetch_profile(&self, token: &str) -> Result<Profile, BackendError> {
        self.send(self.authed(self.client.get(self.url("/user/profile")), token))
            .await
    }

    async fn update_profile(
        &self,
        token: &str,
        profile: &Profile,
    ) -> Result<Profile, BackendError> {
        self.send(
            self.authed(self.client.put(self.url("/user/profile")), token)
                .json(profile),
        )
        .await
    }

    async fn upload_resume(
        &self,
        token: &str,
        upload: &ResumeUpload,
    ) -> Result<ResumeRef, BackendError> {
        let part = reqwest::multipart::Part::bytes(upload.bytes.to_vec())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)?;
        let form = reqwest::multipart::Form::new().part("resume", part);
        self.send(
            self.authed(self.client.post(self.url("/user/resume")), token)
                .multipart(form),
        )
        .await
    }

    async fn submit_application(
        &self,
        token: &str,
        job_id: &str,
        payload: &ApplicationPayload,
    ) -> Result<ApplicationReceipt, BackendError> {
        self.send(
            self.authed(
                self.client.post(self.url(&format!("/jobs/{job_id}/apply"))),
                token,
            )
            .json(payload),
        )
        .await
    }

    async fn recruiter_jobs(&self, token: &str) -> Result<Value, BackendError> {
        self.send(self.authed(self.client.get(self.url("/recruiter/jobs")), token))
            .await
    }

    async fn create_job(&self, token: &str, posting: &JobPosting) -> Result<Value, BackendError> {
        self.send(
            self.authed(self.client.post(self.url("/recruiter/jobs")), token)
                .json(posting),
        )
        .await
    }

    async fn update_job(
        &self,
        token: &str,
        job_id: &str,
        posting: &JobPosting,
    ) -> Result<Value, BackendError> {
        self.send(
            self.authed(
                self.client.put(self.url(&format!("/recruiter/jobs/{job_id}"))),
                token,
            )
            .json(posting),
        )
        .await
    }

    async fn delete_job(&self, token: &str, job_id: &str) -> Result<(), BackendError> {
        self.send_empty(self.authed(
            self.client.delete(self.url(&format!("/recruiter/jobs/{job_id}"))),
            token,
        ))
        .await
    }

    async fn job_applicants(&self, token: &str, job_id: &str) -> Result<Value, BackendError> {
        self.send(self.authed(
            self.client
                .get(self.url(&format!("/recruiter/jobs/{job_id}/applicants"))),
            token,
        ))
        .await
    }

    async fn admin_jobs(&self, token: &str) -> Result<Value, BackendError> {
        self.send(self.authed(self.client.get(self.url("/admin/jobs")), token))
            .await
    }

    async fn admin_applicants(&self, token: &str) -> Result<Value, BackendError> {
        self.send(self.authed(self.client.get(self.url("/admin/applicants")), token))
            .await
    }

    async fn admin_companies(&self, token: &str) -> Result<Value, BackendError> {
        self.send(self.authed(self.client.get(self.url("/admin/companies")), token))
            .await
    }

    async fn raise_objection(
        &self,
        token: &str,
        job_id: &str,
        objection: &Objection,
    ) -> Result<Value, BackendError> {
        self.send(
            self.authed(
                self.client
                    .post(self.url(&format!("/admin/jobs/{job_id}/objection"))),
                token,
            )
            .json(objection),
        )
        .await
    }
}
