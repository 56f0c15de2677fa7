use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wizard::education::EducationRecord;
use crate::wizard::form::{Address, Experience, Language, PersonalDetails, ResumeRef};
use crate::wizard::validation::{require, ValidationFailure};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetail {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    /// Rich text as authored by the recruiter; passed through untouched.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub openings: Option<u32>,
    #[serde(default)]
    pub salary_min: Option<u64>,
    #[serde(default)]
    pub salary_max: Option<u64>,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// What the portal keeps after a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub display_name: String,
}

/// Saved applicant profile, shaped like the wizard form so it can seed one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub personal: PersonalDetails,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub education: Vec<EducationRecord>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub resume: Option<ResumeRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationReceipt {
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub openings: u32,
    #[serde(default)]
    pub salary_min: Option<u64>,
    #[serde(default)]
    pub salary_max: Option<u64>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl JobPosting {
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        const SECTION: &str = "Job Posting";
        require(SECTION, "Title", &self.title)?;
        require(SECTION, "Company", &self.company)?;
        require(SECTION, "Location", &self.location)?;
        require(SECTION, "Description", &self.description)?;
        if self.openings == 0 {
            return Err(ValidationFailure::new(
                SECTION,
                "Openings",
                "Openings must be at least 1",
            ));
        }
        if let (Some(min), Some(max)) = (self.salary_min, self.salary_max) {
            if min > max {
                return Err(ValidationFailure::new(
                    SECTION,
                    "Salary",
                    "Minimum salary cannot exceed maximum salary",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Objection {
    pub reason: String,
}

impl Objection {
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        require("Objection", "Reason", &self.reason)
    }
}
