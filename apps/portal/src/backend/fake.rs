//! In-memory `PortalBackend` for handler and router tests.

use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::backend::models::{
    ApplicationReceipt, AuthSession, Credentials, JobDetail, JobPosting, JobQuery, JobSummary,
    Objection, Profile,
};
use crate::backend::{BackendError, PortalBackend};
use crate::resume::ResumeUpload;
use crate::session::Role;
use crate::wizard::form::{ApplicationForm, ResumeRef};
use crate::wizard::submission::ApplicationPayload;

#[derive(Default)]
pub struct FakeBackend {
    pub uploads: AtomicUsize,
    pub submissions: AtomicUsize,
    pub creates: AtomicUsize,
    /// Saved profile handed out by `fetch_profile`.
    pub profile: Profile,
    /// Non-zero: submissions are rejected with this status.
    pub reject_submissions: AtomicU16,
    /// When set, each submission waits for a permit before answering.
    pub hold_submissions: Option<Arc<Notify>>,
    /// Simulates an expired backend token on profile calls.
    pub token_expired: AtomicBool,
}

impl FakeBackend {
    /// A backend whose saved profile fills every wizard page.
    pub fn with_profile(form: &ApplicationForm) -> Self {
        Self {
            profile: Profile {
                personal: form.personal.clone(),
                address: form.address.clone(),
                education: form.education.records().cloned().collect(),
                experience: form.experience.items().to_vec(),
                skills: form.skills.items().to_vec(),
                languages: form.languages.items().to_vec(),
                resume: form.resume.clone(),
            },
            ..Default::default()
        }
    }
}

pub fn job(id: &str) -> JobDetail {
    JobDetail {
        id: id.to_string(),
        title: "Backend Engineer".to_string(),
        company: "Acme".to_string(),
        location: "Pune".to_string(),
        description: "<p>Build APIs</p>".to_string(),
        skills: vec!["Rust".to_string()],
        openings: Some(1),
        salary_min: None,
        salary_max: None,
        posted_at: None,
    }
}

#[async_trait]
impl PortalBackend for FakeBackend {
    async fn list_jobs(&self, _query: &JobQuery) -> Result<Vec<JobSummary>, BackendError> {
        Ok(vec![JobSummary {
            id: "job-1".to_string(),
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Pune".to_string(),
            posted_at: None,
        }])
    }

    async fn job_detail(&self, job_id: &str) -> Result<JobDetail, BackendError> {
        match job_id {
            "job-1" | "job-2" => Ok(job(job_id)),
            _ => Err(BackendError::NotFound(format!("job {job_id}"))),
        }
    }

    async fn login(
        &self,
        role: Role,
        credentials: &Credentials,
    ) -> Result<AuthSession, BackendError> {
        if credentials.password != "secret" {
            return Err(BackendError::Api {
                status: 400,
                message: "Invalid email or password".to_string(),
            });
        }
        Ok(AuthSession {
            token: format!("{}-token", role.as_str()),
            display_name: "Asha".to_string(),
        })
    }

    async fn logout(&self, _token: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn fetch_profile(&self, _token: &str) -> Result<Profile, BackendError> {
        if self.token_expired.load(Ordering::SeqCst) {
            return Err(BackendError::Unauthorized);
        }
        Ok(self.profile.clone())
    }

    async fn update_profile(
        &self,
        _token: &str,
        profile: &Profile,
    ) -> Result<Profile, BackendError> {
        if self.token_expired.load(Ordering::SeqCst) {
            return Err(BackendError::Unauthorized);
        }
        Ok(profile.clone())
    }

    async fn upload_resume(
        &self,
        _token: &str,
        upload: &ResumeUpload,
    ) -> Result<ResumeRef, BackendError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(ResumeRef {
            file_name: upload.file_name.clone(),
            url: "https://files.test/cv.pdf".to_string(),
        })
    }

    async fn submit_application(
        &self,
        _token: &str,
        _job_id: &str,
        _payload: &ApplicationPayload,
    ) -> Result<ApplicationReceipt, BackendError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        if let Some(hold) = &self.hold_submissions {
            hold.notified().await;
        }
        match self.reject_submissions.load(Ordering::SeqCst) {
            0 => Ok(ApplicationReceipt {
                application_id: Some("app-1".to_string()),
                message: String::new(),
            }),
            status => Err(BackendError::Api {
                status,
                message: "You have already applied to this job".to_string(),
            }),
        }
    }

    async fn recruiter_jobs(&self, _token: &str) -> Result<Value, BackendError> {
        Ok(json!([{ "id": "job-1" }]))
    }

    async fn create_job(&self, _token: &str, posting: &JobPosting) -> Result<Value, BackendError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "id": "job-2", "title": posting.title }))
    }

    async fn update_job(
        &self,
        _token: &str,
        job_id: &str,
        _posting: &JobPosting,
    ) -> Result<Value, BackendError> {
        Ok(json!({ "id": job_id }))
    }

    async fn delete_job(&self, _token: &str, _job_id: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn job_applicants(&self, _token: &str, _job_id: &str) -> Result<Value, BackendError> {
        Ok(json!([]))
    }

    async fn admin_jobs(&self, _token: &str) -> Result<Value, BackendError> {
        Ok(json!([]))
    }

    async fn admin_applicants(&self, _token: &str) -> Result<Value, BackendError> {
        Ok(json!([]))
    }

    async fn admin_companies(&self, _token: &str) -> Result<Value, BackendError> {
        Ok(json!([]))
    }

    async fn raise_objection(
        &self,
        _token: &str,
        _job_id: &str,
        _objection: &Objection,
    ) -> Result<Value, BackendError> {
        Ok(json!({ "ok": true }))
    }
}
