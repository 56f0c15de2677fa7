use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::backend::models::JobPosting;
use crate::errors::AppError;
use crate::notice::Notice;
use crate::session::Session;
use crate::state::AppState;

/// GET /recruiter/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let jobs = state.backend.recruiter_jobs(&session.token).await?;
    Ok(Json(json!({ "jobs": jobs })))
}

/// POST /recruiter/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(posting): Json<JobPosting>,
) -> Result<Json<Value>, AppError> {
    posting.validate()?;
    let job = state.backend.create_job(&session.token, &posting).await?;
    info!("Session {} posted job '{}'", session.id, posting.title);
    Ok(Json(json!({
        "job": job,
        "notice": Notice::success("Job posted"),
    })))
}

/// PUT /recruiter/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(job_id): Path<String>,
    Json(posting): Json<JobPosting>,
) -> Result<Json<Value>, AppError> {
    posting.validate()?;
    let job = state
        .backend
        .update_job(&session.token, &job_id, &posting)
        .await?;
    Ok(Json(json!({
        "job": job,
        "notice": Notice::success("Job updated"),
    })))
}

/// DELETE /recruiter/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.backend.delete_job(&session.token, &job_id).await?;
    info!("Session {} deleted job {job_id}", session.id);
    Ok(Json(json!({ "notice": Notice::success("Job deleted") })))
}

/// GET /recruiter/jobs/:id/applicants
pub async fn handle_job_applicants(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let applicants = state.backend.job_applicants(&session.token, &job_id).await?;
    Ok(Json(json!({ "job_id": job_id, "applicants": applicants })))
}
