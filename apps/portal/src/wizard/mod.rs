//! Application wizard: the stepped, dependency-aware form an applicant fills
//! in before applying to a job. All state lives in `Wizard`; handlers mutate
//! it through the methods below and render it with `view::render`.

pub mod collection;
pub mod education;
pub mod form;
pub mod handlers;
pub mod selection;
pub mod steps;
pub mod submission;
pub mod validation;
pub mod view;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::notice::RequestStatus;
use crate::wizard::collection::CollectionError;
use crate::wizard::education::EducationLevel;
use crate::wizard::form::{ApplicationForm, FieldUpdate, FormError, ResumeRef};
use crate::wizard::selection::SelectionError;
use crate::wizard::steps::{pages_for, NavigationError, StepSequencer, WizardStep};
use crate::wizard::validation::{
    current_year, validate_address, validate_education, validate_experience, validate_languages,
    validate_personal, validate_skills, ValidationFailure,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WizardError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Collection(#[from] CollectionError),
}

/// One applicant's in-progress application for one job.
#[derive(Debug, Clone)]
pub struct Wizard {
    /// Distinguishes this wizard from a later one opened by the same session.
    id: Uuid,
    job_id: String,
    form: ApplicationForm,
    sequencer: StepSequencer,
    submission: Option<RequestStatus>,
}

impl Wizard {
    pub fn new(job_id: String, form: ApplicationForm) -> Self {
        let sequencer = StepSequencer::new(pages_for(&form.education));
        Self {
            id: Uuid::new_v4(),
            job_id,
            form,
            sequencer,
            submission: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn form(&self) -> &ApplicationForm {
        &self.form
    }

    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    pub fn current_step(&self) -> WizardStep {
        self.sequencer.current_step()
    }

    /// Validity predicate for a page.
    pub fn validate_step(
        &self,
        step: WizardStep,
        today: NaiveDate,
    ) -> Result<(), ValidationFailure> {
        validate_step(&self.form, step, today)
    }

    pub fn advance(&mut self, today: NaiveDate) -> Result<WizardStep, WizardError> {
        let form = &self.form;
        let result = self
            .sequencer
            .advance(|step| validate_step(form, step, today));
        self.log_move("advance", &result);
        result?;
        Ok(self.current_step())
    }

    pub fn retreat(&mut self) -> Result<WizardStep, WizardError> {
        let result = self.sequencer.retreat();
        self.log_move("retreat", &result);
        result?;
        Ok(self.current_step())
    }

    pub fn jump(&mut self, target: usize, today: NaiveDate) -> Result<WizardStep, WizardError> {
        let form = &self.form;
        let result = self
            .sequencer
            .jump(target, |step| validate_step(form, step, today));
        self.log_move("jump", &result);
        result?;
        Ok(self.current_step())
    }

    fn log_move(&self, action: &str, result: &Result<usize, NavigationError>) {
        match result {
            Ok(index) => debug!(job_id = %self.job_id, index, "wizard {action}"),
            Err(e) => debug!(job_id = %self.job_id, "wizard {action} rejected: {e}"),
        }
    }

    pub fn select_level(&mut self, level: EducationLevel) -> Result<(), WizardError> {
        self.form.education.select(level)?;
        self.sequencer.set_pages(pages_for(&self.form.education));
        Ok(())
    }

    pub fn deselect_level(&mut self, level: EducationLevel) -> Result<(), WizardError> {
        self.form.education.deselect(level)?;
        self.sequencer.set_pages(pages_for(&self.form.education));
        Ok(())
    }

    pub fn apply(&mut self, update: FieldUpdate) -> Result<(), WizardError> {
        Ok(self.form.apply(update)?)
    }

    pub fn add_experience(&mut self) -> usize {
        self.form.experience.add()
    }

    pub fn remove_experience(&mut self, index: usize) -> Result<(), WizardError> {
        self.form.experience.remove(index)?;
        Ok(())
    }

    pub fn add_language(&mut self) -> usize {
        self.form.languages.add()
    }

    pub fn remove_language(&mut self, index: usize) -> Result<(), WizardError> {
        self.form.languages.remove(index)?;
        Ok(())
    }

    pub fn add_skill(&mut self, skill: &str) -> Result<usize, WizardError> {
        Ok(self.form.add_skill(skill)?)
    }

    pub fn remove_skill(&mut self, index: usize) -> Result<(), WizardError> {
        self.form.skills.remove(index)?;
        Ok(())
    }

    pub fn attach_resume(&mut self, resume: ResumeRef) {
        self.form.resume = Some(resume);
    }

    /// Status of the last submission attempt; `None` until the first one.
    pub fn submission_status(&self) -> Option<RequestStatus> {
        self.submission
    }

    pub fn set_submission_status(&mut self, status: RequestStatus) {
        self.submission = Some(status);
    }
}

pub fn validate_step(
    form: &ApplicationForm,
    step: WizardStep,
    today: NaiveDate,
) -> Result<(), ValidationFailure> {
    match step {
        WizardStep::Personal => validate_personal(&form.personal, today),
        WizardStep::Address => validate_address(&form.address),
        WizardStep::Education(level) => match form.education.record(level) {
            Some(record) => validate_education(record, current_year(today)),
            None => Err(ValidationFailure::new(
                level.label(),
                "Education",
                format!("{level} is not selected"),
            )),
        },
        WizardStep::Experience => validate_experience(form.experience.items()),
        WizardStep::Skills => validate_skills(form.skills.items()),
        WizardStep::Languages => validate_languages(form.languages.items()),
        WizardStep::Resume | WizardStep::Review => Ok(()),
    }
}
