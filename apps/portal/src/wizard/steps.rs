use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::wizard::education::EducationLevel;
use crate::wizard::selection::EducationSelection;
use crate::wizard::validation::ValidationFailure;

/// One page of the application wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "step", content = "level", rename_all = "snake_case")]
pub enum WizardStep {
    Personal,
    Address,
    Education(EducationLevel),
    Experience,
    Skills,
    Languages,
    Resume,
    Review,
}

impl WizardStep {
    pub fn title(self) -> String {
        match self {
            WizardStep::Personal => "Personal Details".to_string(),
            WizardStep::Address => "Address".to_string(),
            WizardStep::Education(level) => format!("Education: {level}"),
            WizardStep::Experience => "Experience".to_string(),
            WizardStep::Skills => "Skills".to_string(),
            WizardStep::Languages => "Languages".to_string(),
            WizardStep::Resume => "Resume".to_string(),
            WizardStep::Review => "Review".to_string(),
        }
    }
}

/// Page list for the current education selection.
pub fn pages_for(selection: &EducationSelection) -> Vec<WizardStep> {
    let mut pages = vec![WizardStep::Personal, WizardStep::Address];
    pages.extend(selection.levels().map(WizardStep::Education));
    pages.extend([
        WizardStep::Experience,
        WizardStep::Skills,
        WizardStep::Languages,
        WizardStep::Resume,
        WizardStep::Review,
    ]);
    pages
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavigationError {
    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Already at the last step")]
    AtLastStep,

    #[error("Step {index} does not exist (the form has {len} steps)")]
    OutOfRange { index: usize, len: usize },

    #[error("Complete \"{}\" before moving ahead", .blocking.title())]
    Locked { blocking: WizardStep },

    #[error(transparent)]
    Invalid(#[from] ValidationFailure),
}

/// Tracks the active page and which pages have been passed.
///
/// Completion is remembered per step rather than per index so that inserting
/// or removing an education page does not shift it onto a different page.
#[derive(Debug, Clone)]
pub struct StepSequencer {
    pages: Vec<WizardStep>,
    current: usize,
    completed: BTreeSet<WizardStep>,
}

impl StepSequencer {
    pub fn new(pages: Vec<WizardStep>) -> Self {
        Self {
            pages,
            current: 0,
            completed: BTreeSet::new(),
        }
    }

    pub fn pages(&self) -> &[WizardStep] {
        &self.pages
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn current_step(&self) -> WizardStep {
        self.pages
            .get(self.current)
            .copied()
            .unwrap_or(WizardStep::Personal)
    }

    pub fn is_completed(&self, step: WizardStep) -> bool {
        self.completed.contains(&step)
    }

    /// Moves forward one page if `check` accepts the current page.
    pub fn advance<F>(&mut self, check: F) -> Result<usize, NavigationError>
    where
        F: FnOnce(WizardStep) -> Result<(), ValidationFailure>,
    {
        if self.current + 1 >= self.pages.len() {
            return Err(NavigationError::AtLastStep);
        }
        let step = self.current_step();
        check(step)?;
        self.completed.insert(step);
        self.current += 1;
        Ok(self.current)
    }

    pub fn retreat(&mut self) -> Result<usize, NavigationError> {
        if self.current == 0 {
            return Err(NavigationError::AtFirstStep);
        }
        self.current -= 1;
        Ok(self.current)
    }

    /// Jumps to `target`. Backwards is always allowed. Forwards requires the
    /// current page to pass `check` and every page in between to be completed.
    pub fn jump<F>(&mut self, target: usize, check: F) -> Result<usize, NavigationError>
    where
        F: FnOnce(WizardStep) -> Result<(), ValidationFailure>,
    {
        if target >= self.pages.len() {
            return Err(NavigationError::OutOfRange {
                index: target,
                len: self.pages.len(),
            });
        }
        if target <= self.current {
            self.current = target;
            return Ok(self.current);
        }
        if let Some(blocking) = self.pages[self.current + 1..target]
            .iter()
            .copied()
            .find(|s| !self.completed.contains(s))
        {
            return Err(NavigationError::Locked { blocking });
        }
        let step = self.current_step();
        check(step)?;
        self.completed.insert(step);
        self.current = target;
        Ok(self.current)
    }

    /// Replaces the page list after the education selection changed.
    ///
    /// Stays on the same page when it still exists; otherwise the index is
    /// clamped to the last valid page. Completion marks of removed pages are dropped.
    pub fn set_pages(&mut self, pages: Vec<WizardStep>) {
        let active = self.current_step();
        self.completed.retain(|s| pages.contains(s));
        self.current = match pages.iter().position(|s| *s == active) {
            Some(i) => i,
            None => self.current.min(pages.len().saturating_sub(1)),
        };
        self.pages = pages;
    }
}
