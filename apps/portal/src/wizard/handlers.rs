//! Axum route handlers for the application wizard.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::models::ApplicationReceipt;
use crate::backend::BackendError;
use crate::errors::AppError;
use crate::notice::{Notice, RequestStatus};
use crate::session::Session;
use crate::state::AppState;
use crate::wizard::education::EducationLevel;
use crate::wizard::form::{ApplicationForm, FieldUpdate};
use crate::wizard::submission::{self, build_payload, form_from_profile, ApplicationPayload};
use crate::wizard::{view, Wizard};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct WizardResponse {
    pub wizard: Value,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

#[derive(Debug, Deserialize)]
pub struct SkillRequest {
    pub skill: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub receipt: ApplicationReceipt,
    pub status: RequestStatus,
    pub notice: Notice,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn no_wizard() -> AppError {
    AppError::NotFound("No application in progress. Open a job and choose Apply.".to_string())
}

fn render_json(wizard: &Wizard) -> Result<Value, AppError> {
    serde_json::to_value(view::render(wizard)).map_err(|e| AppError::Internal(e.into()))
}

fn respond(wizard: &Wizard, notice: Option<Notice>) -> Result<Json<WizardResponse>, AppError> {
    Ok(Json(WizardResponse {
        wizard: render_json(wizard)?,
        status: RequestStatus::Success,
        notice,
    }))
}

/// Runs `f` against the session's wizard under the store lock and renders the result.
/// When `f` fails the wizard is left as `f` found it.
async fn mutate<F>(
    state: &AppState,
    session: &Session,
    f: F,
) -> Result<Json<WizardResponse>, AppError>
where
    F: FnOnce(&mut Wizard) -> Result<Option<Notice>, AppError>,
{
    state
        .store
        .with_wizard(session.id, |wizard| {
            let notice = f(wizard)?;
            respond(wizard, notice)
        })
        .await
        .ok_or_else(no_wizard)?
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /jobs/:id/apply
///
/// Opens a wizard for the job, pre-populated from the saved profile when one loads.
pub async fn handle_start(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(job_id): Path<String>,
) -> Result<Json<WizardResponse>, AppError> {
    let job = state.backend.job_detail(&job_id).await?;

    let (form, notice) = match state.backend.fetch_profile(&session.token).await {
        Ok(profile) => (
            form_from_profile(profile),
            Notice::info(format!("Applying for {}. We filled in your saved profile.", job.title)),
        ),
        Err(BackendError::Unauthorized) => return Err(AppError::Unauthorized),
        Err(e) => {
            warn!("Profile prefill failed for session {}: {e}", session.id);
            (
                ApplicationForm::default(),
                Notice::info(format!(
                    "Applying for {}. Your saved profile could not be loaded.",
                    job.title
                )),
            )
        }
    };

    let wizard = Wizard::new(job.id.clone(), form);
    let response = respond(&wizard, Some(notice))?;
    state.store.open_wizard(session.id, wizard).await;
    info!("Session {} started an application for job {}", session.id, job.id);
    Ok(response)
}

/// GET /wizard
pub async fn handle_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<WizardResponse>, AppError> {
    state
        .store
        .read_wizard(session.id, |wizard| respond(wizard, None))
        .await
        .ok_or_else(no_wizard)?
}

/// DELETE /wizard
pub async fn handle_leave(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> StatusCode {
    state.store.close_wizard(session.id).await;
    StatusCode::NO_CONTENT
}

/// POST /wizard/advance
pub async fn handle_advance(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<WizardResponse>, AppError> {
    let today = today();
    mutate(&state, &session, |w| {
        w.advance(today)?;
        Ok(None)
    })
    .await
}

/// POST /wizard/retreat
pub async fn handle_retreat(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<WizardResponse>, AppError> {
    mutate(&state, &session, |w| {
        w.retreat()?;
        Ok(None)
    })
    .await
}

/// POST /wizard/jump/:index
pub async fn handle_jump(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(index): Path<usize>,
) -> Result<Json<WizardResponse>, AppError> {
    let today = today();
    mutate(&state, &session, |w| {
        w.jump(index, today)?;
        Ok(None)
    })
    .await
}

/// PATCH /wizard/fields
pub async fn handle_update_field(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(update): Json<FieldUpdate>,
) -> Result<Json<WizardResponse>, AppError> {
    mutate(&state, &session, |w| {
        w.apply(update)?;
        Ok(None)
    })
    .await
}

/// POST /wizard/levels/:level
pub async fn handle_select_level(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(level): Path<EducationLevel>,
) -> Result<Json<WizardResponse>, AppError> {
    mutate(&state, &session, |w| {
        w.select_level(level)?;
        Ok(Some(Notice::success(format!("{level} added"))))
    })
    .await
}

/// DELETE /wizard/levels/:level
pub async fn handle_deselect_level(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(level): Path<EducationLevel>,
) -> Result<Json<WizardResponse>, AppError> {
    mutate(&state, &session, |w| {
        w.deselect_level(level)?;
        Ok(Some(Notice::success(format!("{level} removed"))))
    })
    .await
}

/// POST /wizard/experience
pub async fn handle_add_experience(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<WizardResponse>, AppError> {
    mutate(&state, &session, |w| {
        w.add_experience();
        Ok(None)
    })
    .await
}

/// DELETE /wizard/experience/:index
pub async fn handle_remove_experience(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(index): Path<usize>,
) -> Result<Json<WizardResponse>, AppError> {
    mutate(&state, &session, |w| {
        w.remove_experience(index)?;
        Ok(None)
    })
    .await
}

/// POST /wizard/languages
pub async fn handle_add_language(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<WizardResponse>, AppError> {
    mutate(&state, &session, |w| {
        w.add_language();
        Ok(None)
    })
    .await
}

/// DELETE /wizard/languages/:index
pub async fn handle_remove_language(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(index): Path<usize>,
) -> Result<Json<WizardResponse>, AppError> {
    mutate(&state, &session, |w| {
        w.remove_language(index)?;
        Ok(None)
    })
    .await
}

/// POST /wizard/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<SkillRequest>,
) -> Result<Json<WizardResponse>, AppError> {
    mutate(&state, &session, |w| {
        w.add_skill(&req.skill)?;
        Ok(None)
    })
    .await
}

/// DELETE /wizard/skills/:index
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(index): Path<usize>,
) -> Result<Json<WizardResponse>, AppError> {
    mutate(&state, &session, |w| {
        w.remove_skill(index)?;
        Ok(None)
    })
    .await
}

/// POST /wizard/submit
///
/// Validates every page, then forwards the packaged application. The backend
/// call runs on its own task, so its outcome is recorded on the wizard even
/// when the client disconnects mid-request. The wizard is discarded only when
/// the backend accepts it.
pub async fn handle_submit(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<SubmitResponse>, AppError> {
    let today = today();
    let (wizard_id, payload) = state
        .store
        .with_wizard(session.id, |wizard| -> Result<(Uuid, ApplicationPayload), AppError> {
            if wizard.submission_status() == Some(RequestStatus::Loading) {
                return Err(AppError::Validation(
                    "Your application is already being submitted".to_string(),
                ));
            }
            let payload = build_payload(wizard, today)?;
            wizard.set_submission_status(RequestStatus::Loading);
            Ok((wizard.id(), payload))
        })
        .await
        .ok_or_else(no_wizard)??;

    let receipt = tokio::spawn(submit_and_settle(
        state.clone(),
        session.clone(),
        wizard_id,
        payload,
    ))
    .await
    .map_err(|e| AppError::Internal(e.into()))??;

    let message = if receipt.message.trim().is_empty() {
        "Application submitted successfully".to_string()
    } else {
        receipt.message.clone()
    };
    Ok(Json(SubmitResponse {
        receipt,
        status: RequestStatus::Success,
        notice: Notice::success(message),
    }))
}

/// Forwards the application and records the outcome on the wizard it was
/// built from. A wizard the session opened in the meantime is left alone.
async fn submit_and_settle(
    state: AppState,
    session: Session,
    wizard_id: Uuid,
    payload: ApplicationPayload,
) -> Result<ApplicationReceipt, BackendError> {
    let result = submission::submit(state.backend.as_ref(), &session.token, &payload).await;
    match &result {
        Ok(_) => {
            state.store.close_wizard_if(session.id, wizard_id).await;
        }
        Err(e) => {
            warn!("Submission for job {} failed: {e}", payload.job_id);
            state
                .store
                .with_wizard(session.id, |w| {
                    if w.id() == wizard_id {
                        w.set_submission_status(RequestStatus::Error);
                    }
                })
                .await;
        }
    }
    result
}
