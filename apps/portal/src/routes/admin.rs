use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::backend::models::Objection;
use crate::errors::AppError;
use crate::notice::Notice;
use crate::session::Session;
use crate::state::AppState;

/// GET /admin/jobs
pub async fn handle_jobs(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let jobs = state.backend.admin_jobs(&session.token).await?;
    Ok(Json(json!({ "jobs": jobs })))
}

/// GET /admin/applicants
pub async fn handle_applicants(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let applicants = state.backend.admin_applicants(&session.token).await?;
    Ok(Json(json!({ "applicants": applicants })))
}

/// GET /admin/companies
pub async fn handle_companies(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let companies = state.backend.admin_companies(&session.token).await?;
    Ok(Json(json!({ "companies": companies })))
}

/// POST /admin/jobs/:id/objection
pub async fn handle_raise_objection(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(job_id): Path<String>,
    Json(objection): Json<Objection>,
) -> Result<Json<Value>, AppError> {
    objection.validate()?;
    let result = state
        .backend
        .raise_objection(&session.token, &job_id, &objection)
        .await?;
    info!("Session {} raised an objection on job {job_id}", session.id);
    Ok(Json(json!({
        "result": result,
        "notice": Notice::success("Objection sent to the recruiter"),
    })))
}
