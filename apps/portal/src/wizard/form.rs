//! The application form aggregate and the change handlers that mutate it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wizard::collection::{CollectionEditor, CollectionError};
use crate::wizard::education::{EducationField, EducationLevel};
use crate::wizard::selection::EducationSelection;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalDetails {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_of_birth: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalField {
    FullName,
    Email,
    Phone,
    DateOfBirth,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressField {
    Line1,
    Line2,
    City,
    State,
    Pincode,
    Country,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub start_date: String,
    /// Empty means the applicant still works here.
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub description: String,
}

impl Experience {
    pub fn is_blank(&self) -> bool {
        [
            &self.company,
            &self.position,
            &self.start_date,
            &self.end_date,
            &self.description,
        ]
        .iter()
        .all(|v| v.trim().is_empty())
    }

    pub fn is_current(&self) -> bool {
        self.end_date.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceField {
    Company,
    Position,
    StartDate,
    EndDate,
    Description,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Native,
}

impl Proficiency {
    pub const ALL: [Proficiency; 4] = [
        Proficiency::Beginner,
        Proficiency::Intermediate,
        Proficiency::Advanced,
        Proficiency::Native,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(value.trim()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Proficiency::Beginner => "beginner",
            Proficiency::Intermediate => "intermediate",
            Proficiency::Advanced => "advanced",
            Proficiency::Native => "native",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Language {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub proficiency: Proficiency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageField {
    Name,
    Proficiency,
}

/// Reference to a resume already stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRef {
    pub file_name: String,
    pub url: String,
}

/// A single edit coming from the UI.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum FieldUpdate {
    Personal {
        field: PersonalField,
        value: String,
    },
    Address {
        field: AddressField,
        value: String,
    },
    Education {
        level: EducationLevel,
        field: EducationField,
        value: String,
    },
    Experience {
        index: usize,
        field: ExperienceField,
        value: String,
    },
    Language {
        index: usize,
        field: LanguageField,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error("{0} is not selected")]
    LevelNotSelected(EducationLevel),

    #[error("{} does not apply to {level}", .field.label())]
    FieldNotApplicable {
        level: EducationLevel,
        field: EducationField,
    },

    #[error("Unknown proficiency '{0}'")]
    UnknownProficiency(String),

    #[error("Skill cannot be empty")]
    EmptySkill,

    #[error("'{0}' is already in your skills")]
    DuplicateSkill(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationForm {
    pub personal: PersonalDetails,
    pub address: Address,
    pub education: EducationSelection,
    pub experience: CollectionEditor<Experience>,
    pub skills: CollectionEditor<String>,
    pub languages: CollectionEditor<Language>,
    pub resume: Option<ResumeRef>,
}

impl Default for ApplicationForm {
    fn default() -> Self {
        Self {
            personal: PersonalDetails::default(),
            address: Address::default(),
            education: EducationSelection::new(),
            experience: experience_editor(Vec::new()),
            skills: skills_editor(Vec::new()),
            languages: languages_editor(Vec::new()),
            resume: None,
        }
    }
}

pub(crate) fn experience_editor(items: Vec<Experience>) -> CollectionEditor<Experience> {
    CollectionEditor::with_items("experience", 1, items)
}

pub(crate) fn skills_editor(items: Vec<String>) -> CollectionEditor<String> {
    CollectionEditor::with_items("skill", 0, items)
}

pub(crate) fn languages_editor(items: Vec<Language>) -> CollectionEditor<Language> {
    CollectionEditor::with_items("language", 0, items)
}

impl ApplicationForm {
    pub fn apply(&mut self, update: FieldUpdate) -> Result<(), FormError> {
        match update {
            FieldUpdate::Personal { field, value } => {
                let p = &mut self.personal;
                let slot = match field {
                    PersonalField::FullName => &mut p.full_name,
                    PersonalField::Email => &mut p.email,
                    PersonalField::Phone => &mut p.phone,
                    PersonalField::DateOfBirth => &mut p.date_of_birth,
                };
                *slot = value;
            }
            FieldUpdate::Address { field, value } => {
                let a = &mut self.address;
                let slot = match field {
                    AddressField::Line1 => &mut a.line1,
                    AddressField::Line2 => &mut a.line2,
                    AddressField::City => &mut a.city,
                    AddressField::State => &mut a.state,
                    AddressField::Pincode => &mut a.pincode,
                    AddressField::Country => &mut a.country,
                };
                *slot = value;
            }
            FieldUpdate::Education {
                level,
                field,
                value,
            } => {
                let record = self
                    .education
                    .record_mut(level)
                    .ok_or(FormError::LevelNotSelected(level))?;
                if !record.set(field, value) {
                    return Err(FormError::FieldNotApplicable { level, field });
                }
            }
            FieldUpdate::Experience {
                index,
                field,
                value,
            } => {
                let entry = self.experience.get_mut(index)?;
                let slot = match field {
                    ExperienceField::Company => &mut entry.company,
                    ExperienceField::Position => &mut entry.position,
                    ExperienceField::StartDate => &mut entry.start_date,
                    ExperienceField::EndDate => &mut entry.end_date,
                    ExperienceField::Description => &mut entry.description,
                };
                *slot = value;
            }
            FieldUpdate::Language {
                index,
                field,
                value,
            } => {
                // Parse before borrowing so a bad proficiency leaves the entry untouched.
                let proficiency = match field {
                    LanguageField::Proficiency => Some(
                        Proficiency::parse(&value)
                            .ok_or_else(|| FormError::UnknownProficiency(value.clone()))?,
                    ),
                    LanguageField::Name => None,
                };
                let entry = self.languages.get_mut(index)?;
                match proficiency {
                    Some(p) => entry.proficiency = p,
                    None => entry.name = value,
                }
            }
        }
        Ok(())
    }

    /// Adds a trimmed skill, rejecting blanks and case-insensitive duplicates.
    pub fn add_skill(&mut self, skill: &str) -> Result<usize, FormError> {
        let skill = skill.trim();
        if skill.is_empty() {
            return Err(FormError::EmptySkill);
        }
        if self
            .skills
            .iter()
            .any(|s| s.eq_ignore_ascii_case(skill))
        {
            return Err(FormError::DuplicateSkill(skill.to_string()));
        }
        Ok(self.skills.push(skill.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_form_shape() {
        let form = ApplicationForm::default();
        assert_eq!(form.experience.len(), 1);
        assert!(form.languages.is_empty());
        assert!(form.skills.is_empty());
        assert!(form.education.is_selected(EducationLevel::Tenth));
        assert!(form.resume.is_none());
    }

    #[test]
    fn test_apply_personal_and_address() {
        let mut form = ApplicationForm::default();
        form.apply(FieldUpdate::Personal {
            field: PersonalField::Email,
            value: "asha@example.com".to_string(),
        })
        .unwrap();
        form.apply(FieldUpdate::Address {
            field: AddressField::Pincode,
            value: "560001".to_string(),
        })
        .unwrap();
        assert_eq!(form.personal.email, "asha@example.com");
        assert_eq!(form.address.pincode, "560001");
    }

    #[test]
    fn test_apply_education_requires_selected_level() {
        let mut form = ApplicationForm::default();
        let err = form
            .apply(FieldUpdate::Education {
                level: EducationLevel::Ug,
                field: EducationField::Institute,
                value: "IIT".to_string(),
            })
            .unwrap_err();
        assert_eq!(err, FormError::LevelNotSelected(EducationLevel::Ug));
    }

    #[test]
    fn test_apply_education_rejects_foreign_field() {
        let mut form = ApplicationForm::default();
        let err = form
            .apply(FieldUpdate::Education {
                level: EducationLevel::Tenth,
                field: EducationField::Trade,
                value: "Fitter".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Trade does not apply to 10th");
    }

    #[test]
    fn test_apply_language_proficiency() {
        let mut form = ApplicationForm::default();
        form.languages.add();
        form.apply(FieldUpdate::Language {
            index: 0,
            field: LanguageField::Proficiency,
            value: "Native".to_string(),
        })
        .unwrap();
        assert_eq!(form.languages.items()[0].proficiency, Proficiency::Native);

        let err = form
            .apply(FieldUpdate::Language {
                index: 0,
                field: LanguageField::Proficiency,
                value: "fluent-ish".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, FormError::UnknownProficiency(_)));
        assert_eq!(form.languages.items()[0].proficiency, Proficiency::Native);
    }

    #[test]
    fn test_apply_experience_out_of_range() {
        let mut form = ApplicationForm::default();
        let err = form
            .apply(FieldUpdate::Experience {
                index: 3,
                field: ExperienceField::Company,
                value: "Acme".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, FormError::Collection(_)));
    }

    #[test]
    fn test_add_skill_trims_and_dedups() {
        let mut form = ApplicationForm::default();
        assert_eq!(form.add_skill("  Rust ").unwrap(), 0);
        assert_eq!(
            form.add_skill("rust").unwrap_err(),
            FormError::DuplicateSkill("rust".to_string())
        );
        assert_eq!(form.add_skill("   ").unwrap_err(), FormError::EmptySkill);
        assert_eq!(form.skills.items(), &["Rust"]);
    }

    #[test]
    fn test_field_update_deserializes_tagged() {
        let update: FieldUpdate = serde_json::from_str(
            r#"{"section":"education","level":"UG","field":"passing_year","value":"2020"}"#,
        )
        .unwrap();
        assert!(matches!(
            update,
            FieldUpdate::Education {
                level: EducationLevel::Ug,
                field: EducationField::PassingYear,
                ..
            }
        ));
    }

    #[test]
    fn test_blank_experience() {
        assert!(Experience::default().is_blank());
        let e = Experience {
            company: "Acme".to_string(),
            ..Default::default()
        };
        assert!(!e.is_blank());
        assert!(e.is_current());
    }
}
