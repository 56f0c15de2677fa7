use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use tracing::info;

use crate::backend::models::Profile;
use crate::errors::AppError;
use crate::notice::{Notice, RequestStatus};
use crate::resume::{ResumeError, ResumeUpload};
use crate::session::Session;
use crate::state::AppState;
use crate::wizard::form::ResumeRef;

/// Multipart field the browser sends the resume under.
pub const RESUME_FIELD: &str = "resume";

#[derive(Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

#[derive(Serialize)]
pub struct ResumeResponse {
    pub resume: ResumeRef,
    /// True when the resume was also attached to the open application.
    pub attached_to_application: bool,
    pub status: RequestStatus,
    pub notice: Notice,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Resume must be 5 MB or smaller".to_string())
    } else {
        AppError::Validation(format!("Could not read the upload: {}", e.body_text()))
    }
}

/// GET /me/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state.backend.fetch_profile(&session.token).await?;
    Ok(Json(ProfileResponse {
        profile,
        status: RequestStatus::Success,
        notice: None,
    }))
}

/// PUT /me/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(profile): Json<Profile>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state.backend.update_profile(&session.token, &profile).await?;
    info!("Session {} updated its profile", session.id);
    Ok(Json(ProfileResponse {
        profile,
        status: RequestStatus::Success,
        notice: Some(Notice::success("Profile updated")),
    }))
}

/// POST /me/resume
///
/// Type and size are checked before anything is sent to the backend.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> Result<Json<ResumeResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        upload = Some(ResumeUpload {
            file_name,
            content_type,
            bytes,
        });
        break;
    }

    let upload = upload.ok_or(ResumeError::Missing)?;
    upload.validate()?;

    let resume = state.backend.upload_resume(&session.token, &upload).await?;
    let attached = state
        .store
        .with_wizard(session.id, |w| w.attach_resume(resume.clone()))
        .await
        .is_some();
    info!(
        "Session {} uploaded resume {} ({} bytes)",
        session.id,
        upload.file_name,
        upload.bytes.len()
    );

    Ok(Json(ResumeResponse {
        resume,
        attached_to_application: attached,
        status: RequestStatus::Success,
        notice: Notice::success("Resume uploaded"),
    }))
}
