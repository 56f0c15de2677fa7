//! Converts wizard state to and from what the backend understands.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::backend::models::{ApplicationReceipt, Profile};
use crate::backend::{BackendError, PortalBackend};
use crate::wizard::education::{EducationField, EducationLevel, EducationRecord};
use crate::wizard::form::{
    experience_editor, languages_editor, skills_editor, Address, ApplicationForm, Language,
    PersonalDetails, ResumeRef,
};
use crate::wizard::selection::EducationSelection;
use crate::wizard::steps::WizardStep;
use crate::wizard::validation::{
    parse_date, parse_duration, parse_passing_year, parse_percentage, ValidationFailure,
};
use crate::wizard::Wizard;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{failure}")]
pub struct Incomplete {
    /// Page the applicant is sent back to.
    pub page: usize,
    pub step: WizardStep,
    pub failure: ValidationFailure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationPayload {
    pub level: EducationLevel,
    pub institute: String,
    pub certifying_body: String,
    pub passing_year: i32,
    pub percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_years: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperiencePayload {
    pub company: String,
    pub position: String,
    pub start_date: NaiveDate,
    /// `None` for the current job.
    pub end_date: Option<NaiveDate>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationPayload {
    pub job_id: String,
    pub personal: PersonalDetails,
    pub date_of_birth: NaiveDate,
    pub address: Address,
    pub education: Vec<EducationPayload>,
    pub experience: Vec<ExperiencePayload>,
    pub skills: Vec<String>,
    pub languages: Vec<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<ResumeRef>,
}

/// Validates every page in order and packages the form for submission.
/// The first failing page is reported; nothing is packaged in that case.
pub fn build_payload(wizard: &Wizard, today: NaiveDate) -> Result<ApplicationPayload, Incomplete> {
    for (page, step) in wizard.sequencer().pages().iter().enumerate() {
        wizard
            .validate_step(*step, today)
            .map_err(|failure| Incomplete {
                page,
                step: *step,
                failure,
            })?;
    }

    let form = wizard.form();
    package(wizard.job_id(), form, today.year()).map_err(|failure| Incomplete {
        page: wizard.sequencer().index(),
        step: wizard.current_step(),
        failure,
    })
}

fn package(
    job_id: &str,
    form: &ApplicationForm,
    current_year: i32,
) -> Result<ApplicationPayload, ValidationFailure> {
    let date_of_birth = parse_date(
        "Personal Details",
        "Date of Birth",
        &form.personal.date_of_birth,
    )?;

    let education = form
        .education
        .records()
        .map(|r| education_payload(r, current_year))
        .collect::<Result<Vec<_>, _>>()?;

    let mut experience = Vec::new();
    for (i, entry) in form.experience.iter().enumerate() {
        if entry.is_blank() {
            continue;
        }
        let section = format!("Experience {}", i + 1);
        let start_date = parse_date(&section, "Start Date", &entry.start_date)?;
        let end_date = if entry.is_current() {
            None
        } else {
            Some(parse_date(&section, "End Date", &entry.end_date)?)
        };
        experience.push(ExperiencePayload {
            company: entry.company.trim().to_string(),
            position: entry.position.trim().to_string(),
            start_date,
            end_date,
            description: entry.description.clone(),
        });
    }

    Ok(ApplicationPayload {
        job_id: job_id.to_string(),
        personal: form.personal.clone(),
        date_of_birth,
        address: form.address.clone(),
        education,
        experience,
        skills: form.skills.items().to_vec(),
        languages: form.languages.items().to_vec(),
        resume: form.resume.clone(),
    })
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Trimmed value of `field`, or `None` when it is blank or not part of the level.
fn level_field(record: &EducationRecord, field: EducationField) -> Option<String> {
    if record.level.accepts(field) {
        non_empty(record.get(field))
    } else {
        None
    }
}

fn education_payload(
    record: &EducationRecord,
    current_year: i32,
) -> Result<EducationPayload, ValidationFailure> {
    let section = record.level.label();
    let duration_years = match level_field(record, EducationField::Duration) {
        Some(d) => Some(parse_duration(section, &d)?),
        None => None,
    };
    Ok(EducationPayload {
        level: record.level,
        institute: record.institute.trim().to_string(),
        certifying_body: record.certifying_body().trim().to_string(),
        passing_year: parse_passing_year(section, &record.passing_year, current_year)?,
        percentage: parse_percentage(section, &record.percentage)?,
        stream: level_field(record, EducationField::Stream),
        trade: level_field(record, EducationField::Trade),
        course: level_field(record, EducationField::Course),
        specialization: level_field(record, EducationField::Specialization),
        duration_years,
    })
}

/// Seeds a form from the applicant's saved profile.
pub fn form_from_profile(profile: Profile) -> ApplicationForm {
    ApplicationForm {
        personal: profile.personal,
        address: profile.address,
        education: EducationSelection::restore(profile.education),
        experience: experience_editor(profile.experience),
        skills: skills_editor(profile.skills),
        languages: languages_editor(profile.languages),
        resume: profile.resume,
    }
}

/// Forwards a packaged application to the backend.
pub async fn submit(
    backend: &dyn PortalBackend,
    token: &str,
    payload: &ApplicationPayload,
) -> Result<ApplicationReceipt, BackendError> {
    let receipt = backend
        .submit_application(token, &payload.job_id, payload)
        .await?;
    info!(
        "Application submitted for job {} ({} education records, {} experience entries)",
        payload.job_id,
        payload.education.len(),
        payload.experience.len()
    );
    Ok(receipt)
}
