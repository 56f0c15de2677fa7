//! Education levels, the records kept for each, and the prerequisite graph between levels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One stage of an applicant's academic history.
///
/// Variant order is the canonical display order; `Ord` follows it, so a
/// `BTreeMap<EducationLevel, _>` iterates levels the way the wizard shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EducationLevel {
    #[serde(rename = "10th")]
    Tenth,
    #[serde(rename = "12th")]
    Twelfth,
    #[serde(rename = "ITI", alias = "iti")]
    Iti,
    #[serde(rename = "Diploma", alias = "diploma")]
    Diploma,
    #[serde(rename = "UG", alias = "ug")]
    Ug,
    #[serde(rename = "PG", alias = "pg")]
    Pg,
}

use EducationLevel::*;

/// level → levels that must already be selected before it can be selected.
const PREREQUISITES: &[(EducationLevel, &[EducationLevel])] = &[
    (Tenth, &[]),
    (Twelfth, &[]),
    (Iti, &[]),
    (Diploma, &[]),
    (Ug, &[Twelfth]),
    (Pg, &[Twelfth, Ug]),
];

/// level → levels that cannot stay selected without it. Inverse of `PREREQUISITES`.
const DEPENDENTS: &[(EducationLevel, &[EducationLevel])] = &[
    (Tenth, &[]),
    (Twelfth, &[Ug, Pg]),
    (Iti, &[]),
    (Diploma, &[]),
    (Ug, &[Pg]),
    (Pg, &[]),
];

fn lookup(
    table: &'static [(EducationLevel, &'static [EducationLevel])],
    level: EducationLevel,
) -> &'static [EducationLevel] {
    table
        .iter()
        .find(|(l, _)| *l == level)
        .map(|(_, levels)| *levels)
        .unwrap_or(&[])
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 6] = [Tenth, Twelfth, Iti, Diploma, Ug, Pg];

    pub fn label(self) -> &'static str {
        match self {
            Tenth => "10th",
            Twelfth => "12th",
            Iti => "ITI",
            Diploma => "Diploma",
            Ug => "UG",
            Pg => "PG",
        }
    }

    pub fn prerequisites(self) -> &'static [EducationLevel] {
        lookup(PREREQUISITES, self)
    }

    pub fn dependents(self) -> &'static [EducationLevel] {
        lookup(DEPENDENTS, self)
    }

    /// 10th is always part of the form and cannot be removed.
    pub fn is_permanent(self) -> bool {
        self == Tenth
    }

    /// Fields that must be filled (and well-formed) before leaving this level's page.
    pub fn required_fields(self) -> &'static [EducationField] {
        use EducationField as F;
        match self {
            Tenth => &[F::Institute, F::Board, F::PassingYear, F::Percentage],
            Twelfth => &[
                F::Institute,
                F::Board,
                F::Stream,
                F::PassingYear,
                F::Percentage,
            ],
            Iti => &[
                F::Institute,
                F::Trade,
                F::Duration,
                F::PassingYear,
                F::Percentage,
            ],
            Diploma => &[
                F::Institute,
                F::Board,
                F::Course,
                F::Duration,
                F::PassingYear,
                F::Percentage,
            ],
            Ug | Pg => &[
                F::Institute,
                F::University,
                F::Course,
                F::Specialization,
                F::PassingYear,
                F::Percentage,
            ],
        }
    }

    pub fn accepts(self, field: EducationField) -> bool {
        self.required_fields().contains(&field)
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Joins level labels for user-facing messages: "UG", "UG and PG", "12th, UG and PG".
pub fn join_levels(levels: &[EducationLevel]) -> String {
    match levels {
        [] => String::new(),
        [only] => only.label().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|l| l.label()).collect();
            format!("{} and {}", head.join(", "), last.label())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationField {
    Institute,
    Board,
    University,
    Stream,
    Trade,
    Course,
    Specialization,
    Duration,
    PassingYear,
    Percentage,
}

impl EducationField {
    pub const ALL: [EducationField; 10] = [
        EducationField::Institute,
        EducationField::Board,
        EducationField::University,
        EducationField::Stream,
        EducationField::Trade,
        EducationField::Course,
        EducationField::Specialization,
        EducationField::Duration,
        EducationField::PassingYear,
        EducationField::Percentage,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EducationField::Institute => "Institute Name",
            EducationField::Board => "Board",
            EducationField::University => "University",
            EducationField::Stream => "Stream",
            EducationField::Trade => "Trade",
            EducationField::Course => "Course",
            EducationField::Specialization => "Specialization",
            EducationField::Duration => "Duration",
            EducationField::PassingYear => "Passing Year",
            EducationField::Percentage => "Percentage",
        }
    }
}

/// Free-form values entered for one education level. Values stay as typed
/// text until submission; the validator decides whether they are well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub level: EducationLevel,
    #[serde(default)]
    pub institute: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub board: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub university: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stream: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trade: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub course: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub specialization: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub duration: String,
    #[serde(default)]
    pub passing_year: String,
    #[serde(default)]
    pub percentage: String,
}

impl EducationRecord {
    pub fn empty(level: EducationLevel) -> Self {
        Self {
            level,
            institute: String::new(),
            board: String::new(),
            university: String::new(),
            stream: String::new(),
            trade: String::new(),
            course: String::new(),
            specialization: String::new(),
            duration: String::new(),
            passing_year: String::new(),
            percentage: String::new(),
        }
    }

    pub fn get(&self, field: EducationField) -> &str {
        match field {
            EducationField::Institute => &self.institute,
            EducationField::Board => &self.board,
            EducationField::University => &self.university,
            EducationField::Stream => &self.stream,
            EducationField::Trade => &self.trade,
            EducationField::Course => &self.course,
            EducationField::Specialization => &self.specialization,
            EducationField::Duration => &self.duration,
            EducationField::PassingYear => &self.passing_year,
            EducationField::Percentage => &self.percentage,
        }
    }

    fn slot(&mut self, field: EducationField) -> &mut String {
        match field {
            EducationField::Institute => &mut self.institute,
            EducationField::Board => &mut self.board,
            EducationField::University => &mut self.university,
            EducationField::Stream => &mut self.stream,
            EducationField::Trade => &mut self.trade,
            EducationField::Course => &mut self.course,
            EducationField::Specialization => &mut self.specialization,
            EducationField::Duration => &mut self.duration,
            EducationField::PassingYear => &mut self.passing_year,
            EducationField::Percentage => &mut self.percentage,
        }
    }

    /// Stores `value` if the field belongs to this record's level. Returns false otherwise.
    pub fn set(&mut self, field: EducationField, value: String) -> bool {
        if !self.level.accepts(field) {
            return false;
        }
        *self.slot(field) = value;
        true
    }

    /// Clears values held in fields this record's level does not have.
    /// Saved records may carry them; the form can neither show nor edit them.
    pub fn clear_inapplicable(&mut self) {
        for field in EducationField::ALL {
            if !self.level.accepts(field) {
                self.slot(field).clear();
            }
        }
    }

    /// Board for school-level records, university for degrees.
    pub fn certifying_body(&self) -> &str {
        match self.level {
            Ug | Pg => &self.university,
            _ => &self.board,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependents_table_is_inverse_of_prerequisites() {
        for level in EducationLevel::ALL {
            for dependent in level.dependents() {
                assert!(
                    dependent.prerequisites().contains(&level),
                    "{dependent} lists no prerequisite {level}"
                );
            }
            for prerequisite in level.prerequisites() {
                assert!(
                    prerequisite.dependents().contains(&level),
                    "{prerequisite} lists no dependent {level}"
                );
            }
        }
    }

    #[test]
    fn test_clear_inapplicable_keeps_level_fields() {
        let mut record = EducationRecord {
            institute: "KV Hebbal".to_string(),
            board: "CBSE".to_string(),
            duration: "abc".to_string(),
            specialization: "CSE".to_string(),
            passing_year: "2014".to_string(),
            ..EducationRecord::empty(Tenth)
        };
        record.clear_inapplicable();
        assert_eq!(record.duration, "");
        assert_eq!(record.specialization, "");
        assert_eq!(record.board, "CBSE");
        assert_eq!(record.passing_year, "2014");
    }

    #[test]
    fn test_prerequisite_chain() {
        assert_eq!(Ug.prerequisites(), &[Twelfth]);
        assert_eq!(Pg.prerequisites(), &[Twelfth, Ug]);
        assert!(Iti.prerequisites().is_empty());
        assert_eq!(Twelfth.dependents(), &[Ug, Pg]);
    }

    #[test]
    fn test_level_serde_uses_labels() {
        assert_eq!(serde_json::to_string(&Tenth).unwrap(), r#""10th""#);
        assert_eq!(serde_json::to_string(&Ug).unwrap(), r#""UG""#);
        let level: EducationLevel = serde_json::from_str(r#""pg""#).unwrap();
        assert_eq!(level, Pg);
    }

    #[test]
    fn test_join_levels() {
        assert_eq!(join_levels(&[Ug]), "UG");
        assert_eq!(join_levels(&[Ug, Pg]), "UG and PG");
        assert_eq!(join_levels(&[Twelfth, Ug, Pg]), "12th, UG and PG");
    }

    #[test]
    fn test_set_rejects_field_of_other_level() {
        let mut record = EducationRecord::empty(Tenth);
        assert!(!record.set(EducationField::Specialization, "CS".to_string()));
        assert!(record.set(EducationField::Board, "CBSE".to_string()));
        assert_eq!(record.get(EducationField::Board), "CBSE");
    }

    #[test]
    fn test_certifying_body_by_level() {
        let mut ug = EducationRecord::empty(Ug);
        ug.set(EducationField::University, "Delhi University".to_string());
        assert_eq!(ug.certifying_body(), "Delhi University");

        let mut twelfth = EducationRecord::empty(Twelfth);
        twelfth.set(EducationField::Board, "ICSE".to_string());
        assert_eq!(twelfth.certifying_body(), "ICSE");
    }
}
