//! Field-group validators.
//!
//! Every validator reports the first failing field only. Within a group all
//! empty-checks run before any format-check, so an applicant who left a
//! field blank hears about that before being told another value is malformed.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::wizard::education::{EducationField, EducationRecord};
use crate::wizard::form::{Address, Experience, Language, PersonalDetails};

pub const MIN_PASSING_YEAR: i32 = 1950;
pub const MAX_PERCENTAGE: f64 = 100.0;
pub const MAX_DURATION_YEARS: f64 = 10.0;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single failed check, naming the section and field it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{reason}")]
pub struct ValidationFailure {
    pub section: String,
    pub field: String,
    pub reason: String,
}

impl ValidationFailure {
    pub fn new(
        section: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub(crate) fn require(section: &str, label: &str, value: &str) -> Result<(), ValidationFailure> {
    if value.trim().is_empty() {
        return Err(ValidationFailure::new(
            section,
            label,
            format!("Please enter {label} for {section}"),
        ));
    }
    Ok(())
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

/// Parses a 4-digit year in `[MIN_PASSING_YEAR, current_year]`.
pub fn parse_passing_year(
    section: &str,
    value: &str,
    current_year: i32,
) -> Result<i32, ValidationFailure> {
    let label = EducationField::PassingYear.label();
    let value = value.trim();
    let year = if is_digits(value, 4) {
        value.parse::<i32>().ok()
    } else {
        None
    };
    let year = year.ok_or_else(|| {
        ValidationFailure::new(
            section,
            label,
            format!("{label} for {section} must be a 4-digit year"),
        )
    })?;
    if !(MIN_PASSING_YEAR..=current_year).contains(&year) {
        return Err(ValidationFailure::new(
            section,
            label,
            format!("{label} for {section} must be between {MIN_PASSING_YEAR} and {current_year}"),
        ));
    }
    Ok(year)
}

/// Parses a percentage in `[0, 100]`.
pub fn parse_percentage(section: &str, value: &str) -> Result<f64, ValidationFailure> {
    let label = EducationField::Percentage.label();
    let pct = parse_number(value).ok_or_else(|| {
        ValidationFailure::new(section, label, format!("{label} for {section} must be a number"))
    })?;
    if !(0.0..=MAX_PERCENTAGE).contains(&pct) {
        return Err(ValidationFailure::new(
            section,
            label,
            format!("{label} for {section} must be between 0 and {MAX_PERCENTAGE}"),
        ));
    }
    Ok(pct)
}

/// Parses a course duration in years, in `(0, 10]`.
pub fn parse_duration(section: &str, value: &str) -> Result<f64, ValidationFailure> {
    let label = EducationField::Duration.label();
    let years = parse_number(value).ok_or_else(|| {
        ValidationFailure::new(
            section,
            label,
            format!("{label} for {section} must be a number of years"),
        )
    })?;
    if years <= 0.0 || years > MAX_DURATION_YEARS {
        return Err(ValidationFailure::new(
            section,
            label,
            format!(
                "{label} for {section} must be more than 0 and at most {MAX_DURATION_YEARS} years"
            ),
        ));
    }
    Ok(years)
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn parse_date(section: &str, label: &str, value: &str) -> Result<NaiveDate, ValidationFailure> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ValidationFailure::new(
            section,
            label,
            format!("{label} for {section} must be a date in YYYY-MM-DD format"),
        )
    })
}

/// Validates one education record against its level's required fields.
pub fn validate_education(
    record: &EducationRecord,
    current_year: i32,
) -> Result<(), ValidationFailure> {
    let section = record.level.label();
    let fields = record.level.required_fields();

    for field in fields {
        require(section, field.label(), record.get(*field))?;
    }

    for field in fields {
        let value = record.get(*field);
        match field {
            EducationField::PassingYear => {
                parse_passing_year(section, value, current_year)?;
            }
            EducationField::Percentage => {
                parse_percentage(section, value)?;
            }
            EducationField::Duration => {
                parse_duration(section, value)?;
            }
            _ => {}
        }
    }
    Ok(())
}

const PERSONAL: &str = "Personal Details";

pub fn validate_personal(
    details: &PersonalDetails,
    today: NaiveDate,
) -> Result<(), ValidationFailure> {
    require(PERSONAL, "Full Name", &details.full_name)?;
    require(PERSONAL, "Email", &details.email)?;
    require(PERSONAL, "Phone", &details.phone)?;
    require(PERSONAL, "Date of Birth", &details.date_of_birth)?;

    if !is_email(details.email.trim()) {
        return Err(ValidationFailure::new(
            PERSONAL,
            "Email",
            "Please enter a valid email address",
        ));
    }
    if !is_digits(details.phone.trim(), 10) {
        return Err(ValidationFailure::new(
            PERSONAL,
            "Phone",
            "Phone must be a 10-digit number",
        ));
    }
    let dob = parse_date(PERSONAL, "Date of Birth", &details.date_of_birth)?;
    if dob > today {
        return Err(ValidationFailure::new(
            PERSONAL,
            "Date of Birth",
            "Date of Birth cannot be in the future",
        ));
    }
    Ok(())
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

const ADDRESS: &str = "Address";

pub fn validate_address(address: &Address) -> Result<(), ValidationFailure> {
    require(ADDRESS, "Address Line 1", &address.line1)?;
    require(ADDRESS, "City", &address.city)?;
    require(ADDRESS, "State", &address.state)?;
    require(ADDRESS, "Pincode", &address.pincode)?;

    if !is_digits(address.pincode.trim(), 6) {
        return Err(ValidationFailure::new(
            ADDRESS,
            "Pincode",
            "Pincode must be a 6-digit number",
        ));
    }
    Ok(())
}

/// Entirely blank rows are skipped; they stand for "no experience" and are
/// dropped at submission.
pub fn validate_experience(entries: &[Experience]) -> Result<(), ValidationFailure> {
    for (i, entry) in entries.iter().enumerate().filter(|(_, e)| !e.is_blank()) {
        let section = format!("Experience {}", i + 1);
        require(&section, "Company", &entry.company)?;
        require(&section, "Position", &entry.position)?;
        require(&section, "Start Date", &entry.start_date)?;

        let start = parse_date(&section, "Start Date", &entry.start_date)?;
        if !entry.is_current() {
            let end = parse_date(&section, "End Date", &entry.end_date)?;
            if end < start {
                return Err(ValidationFailure::new(
                    &section,
                    "End Date",
                    format!("End Date for {section} cannot be before Start Date"),
                ));
            }
        }
    }
    Ok(())
}

pub fn validate_skills(skills: &[String]) -> Result<(), ValidationFailure> {
    if skills.iter().all(|s| s.trim().is_empty()) {
        return Err(ValidationFailure::new(
            "Skills",
            "Skills",
            "Please add at least one skill",
        ));
    }
    Ok(())
}

pub fn validate_languages(languages: &[Language]) -> Result<(), ValidationFailure> {
    if languages.is_empty() {
        return Err(ValidationFailure::new(
            "Languages",
            "Language",
            "Please add at least one language",
        ));
    }
    for (i, language) in languages.iter().enumerate() {
        require(&format!("Language {}", i + 1), "Language Name", &language.name)?;
    }
    Ok(())
}

pub fn current_year(today: NaiveDate) -> i32 {
    today.year()
}
