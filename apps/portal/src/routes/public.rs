use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use crate::backend::models::{JobDetail, JobQuery, JobSummary};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobSummary>,
}

#[derive(Serialize)]
pub struct JobDetailResponse {
    pub job: JobDetail,
    /// Where the Apply button points.
    pub apply_route: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PolicyPage {
    pub slug: &'static str,
    pub title: &'static str,
    pub body: &'static str,
}

const POLICIES: &[PolicyPage] = &[
    PolicyPage {
        slug: "privacy",
        title: "Privacy Policy",
        body: "We collect the details you enter in your profile and applications only to share \
               them with the employers you apply to. Resumes are stored by the job portal and are \
               never sold.",
    },
    PolicyPage {
        slug: "terms",
        title: "Terms and Conditions",
        body: "By using the portal you agree to provide accurate information. Recruiters are \
               responsible for the accuracy of their job postings.",
    },
    PolicyPage {
        slug: "refund",
        title: "Refund Policy",
        body: "Applying to jobs is free. Paid recruiter plans may be refunded within 7 days of \
               purchase if no job has been posted.",
    },
];

pub fn policy(slug: &str) -> Option<&'static PolicyPage> {
    POLICIES.iter().find(|p| p.slug == slug)
}

/// GET /
/// Landing page: the newest openings.
pub async fn handle_home(State(state): State<AppState>) -> Result<Json<JobListResponse>, AppError> {
    let jobs = state.backend.list_jobs(&JobQuery::default()).await?;
    Ok(Json(JobListResponse { jobs }))
}

/// GET /jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = state.backend.list_jobs(&query).await?;
    Ok(Json(JobListResponse { jobs }))
}

/// GET /jobs/:id
pub async fn handle_job_detail(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobDetailResponse>, AppError> {
    let job = state.backend.job_detail(&job_id).await?;
    let apply_route = format!("/jobs/{}/apply", job.id);
    Ok(Json(JobDetailResponse { job, apply_route }))
}

/// GET /policies/:slug
pub async fn handle_policy(Path(slug): Path<String>) -> Result<Json<PolicyPage>, AppError> {
    policy(&slug)
        .copied()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("policy '{slug}'")))
}
