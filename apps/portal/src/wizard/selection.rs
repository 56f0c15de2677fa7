use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::warn;

use crate::wizard::education::{join_levels, EducationLevel, EducationRecord};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("{0} is already selected")]
    AlreadySelected(EducationLevel),

    #[error("{0} is not selected")]
    NotSelected(EducationLevel),

    #[error("Select {} before adding {level}", join_levels(.missing))]
    MissingPrerequisites {
        level: EducationLevel,
        missing: Vec<EducationLevel>,
    },

    #[error("Cannot remove {level} while {} is selected", join_levels(.dependents))]
    HasDependents {
        level: EducationLevel,
        dependents: Vec<EducationLevel>,
    },

    #[error("{0} is required and cannot be removed")]
    Permanent(EducationLevel),
}

/// The set of selected education levels, each holding its record.
///
/// 10th is always present. Every transition is checked against the
/// prerequisite table in `education.rs`; a rejected transition leaves the
/// selection untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct EducationSelection {
    records: BTreeMap<EducationLevel, EducationRecord>,
}

impl Default for EducationSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl EducationSelection {
    pub fn new() -> Self {
        let mut records = BTreeMap::new();
        records.insert(
            EducationLevel::Tenth,
            EducationRecord::empty(EducationLevel::Tenth),
        );
        Self { records }
    }

    /// Rebuilds a selection from saved records. Levels are replayed in
    /// canonical order; a record whose prerequisites are missing is dropped,
    /// and values in fields its level does not have are cleared.
    pub fn restore(saved: impl IntoIterator<Item = EducationRecord>) -> Self {
        let mut by_level: BTreeMap<EducationLevel, EducationRecord> = BTreeMap::new();
        for mut record in saved {
            record.clear_inapplicable();
            by_level.insert(record.level, record);
        }

        let mut selection = Self::new();
        for (level, record) in by_level {
            if level.is_permanent() {
                selection.records.insert(level, record);
                continue;
            }
            match selection.select(level) {
                Ok(()) => {
                    selection.records.insert(level, record);
                }
                Err(e) => warn!("Dropping saved {level} record: {e}"),
            }
        }
        selection
    }

    pub fn is_selected(&self, level: EducationLevel) -> bool {
        self.records.contains_key(&level)
    }

    /// Selected levels in canonical order.
    pub fn levels(&self) -> impl Iterator<Item = EducationLevel> + '_ {
        self.records.keys().copied()
    }

    pub fn records(&self) -> impl Iterator<Item = &EducationRecord> {
        self.records.values()
    }

    pub fn record(&self, level: EducationLevel) -> Option<&EducationRecord> {
        self.records.get(&level)
    }

    pub fn record_mut(&mut self, level: EducationLevel) -> Option<&mut EducationRecord> {
        self.records.get_mut(&level)
    }

    pub fn missing_prerequisites(&self, level: EducationLevel) -> Vec<EducationLevel> {
        level
            .prerequisites()
            .iter()
            .copied()
            .filter(|p| !self.is_selected(*p))
            .collect()
    }

    pub fn selected_dependents(&self, level: EducationLevel) -> Vec<EducationLevel> {
        level
            .dependents()
            .iter()
            .copied()
            .filter(|d| self.is_selected(*d))
            .collect()
    }

    pub fn can_select(&self, level: EducationLevel) -> bool {
        !self.is_selected(level) && self.missing_prerequisites(level).is_empty()
    }

    pub fn can_deselect(&self, level: EducationLevel) -> bool {
        self.is_selected(level)
            && !level.is_permanent()
            && self.selected_dependents(level).is_empty()
    }

    /// Selects `level`, materialising an empty record for it.
    pub fn select(&mut self, level: EducationLevel) -> Result<(), SelectionError> {
        if self.is_selected(level) {
            return Err(SelectionError::AlreadySelected(level));
        }
        let missing = self.missing_prerequisites(level);
        if !missing.is_empty() {
            return Err(SelectionError::MissingPrerequisites { level, missing });
        }
        self.records.insert(level, EducationRecord::empty(level));
        Ok(())
    }

    /// Deselects `level` and returns the discarded record.
    pub fn deselect(&mut self, level: EducationLevel) -> Result<EducationRecord, SelectionError> {
        if level.is_permanent() {
            return Err(SelectionError::Permanent(level));
        }
        if !self.is_selected(level) {
            return Err(SelectionError::NotSelected(level));
        }
        let dependents = self.selected_dependents(level);
        if !dependents.is_empty() {
            return Err(SelectionError::HasDependents { level, dependents });
        }
        self.records
            .remove(&level)
            .ok_or(SelectionError::NotSelected(level))
    }
}

impl Serialize for EducationSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.records.values())
    }
}
