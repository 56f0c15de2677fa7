//! Read-only projections of the wizard, one per step kind.

use serde::Serialize;

use crate::notice::RequestStatus;
use crate::resume::{MAX_RESUME_BYTES, PDF_CONTENT_TYPE};
use crate::wizard::education::{EducationField, EducationLevel, EducationRecord};
use crate::wizard::form::{
    Address, ApplicationForm, Experience, Language, PersonalDetails, Proficiency, ResumeRef,
};
use crate::wizard::steps::WizardStep;
use crate::wizard::Wizard;

#[derive(Debug, Serialize)]
pub struct FieldView<'a> {
    pub field: EducationField,
    pub label: &'static str,
    pub value: &'a str,
}

/// Whether a level can be toggled from the education pages right now.
#[derive(Debug, Serialize)]
pub struct LevelOption {
    pub level: EducationLevel,
    pub selected: bool,
    pub can_select: bool,
    pub can_remove: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepView<'a> {
    Personal {
        details: &'a PersonalDetails,
    },
    Address {
        address: &'a Address,
    },
    Education {
        level: EducationLevel,
        fields: Vec<FieldView<'a>>,
        levels: Vec<LevelOption>,
    },
    Experience {
        entries: &'a [Experience],
        can_remove: bool,
    },
    Skills {
        skills: &'a [String],
    },
    Languages {
        entries: &'a [Language],
        proficiencies: &'static [Proficiency],
    },
    Resume {
        resume: Option<&'a ResumeRef>,
        accepted_type: &'static str,
        max_bytes: usize,
    },
    Review {
        form: &'a ApplicationForm,
    },
}

#[derive(Debug, Serialize)]
pub struct PageTab {
    pub index: usize,
    pub title: String,
    pub completed: bool,
    pub current: bool,
}

#[derive(Debug, Serialize)]
pub struct WizardView<'a> {
    pub job_id: &'a str,
    pub step_index: usize,
    pub total_steps: usize,
    pub step: WizardStep,
    pub pages: Vec<PageTab>,
    pub content: StepView<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<RequestStatus>,
}

/// The single dispatch from a step to what the UI shows for it.
pub fn render_step(step: WizardStep, form: &ApplicationForm) -> StepView<'_> {
    match step {
        WizardStep::Personal => StepView::Personal {
            details: &form.personal,
        },
        WizardStep::Address => StepView::Address {
            address: &form.address,
        },
        WizardStep::Education(level) => StepView::Education {
            level,
            fields: form
                .education
                .record(level)
                .map(field_views)
                .unwrap_or_default(),
            levels: EducationLevel::ALL
                .into_iter()
                .map(|l| LevelOption {
                    level: l,
                    selected: form.education.is_selected(l),
                    can_select: form.education.can_select(l),
                    can_remove: form.education.can_deselect(l),
                })
                .collect(),
        },
        WizardStep::Experience => StepView::Experience {
            entries: form.experience.items(),
            can_remove: form.experience.can_remove(),
        },
        WizardStep::Skills => StepView::Skills {
            skills: form.skills.items(),
        },
        WizardStep::Languages => StepView::Languages {
            entries: form.languages.items(),
            proficiencies: &Proficiency::ALL,
        },
        WizardStep::Resume => StepView::Resume {
            resume: form.resume.as_ref(),
            accepted_type: PDF_CONTENT_TYPE,
            max_bytes: MAX_RESUME_BYTES,
        },
        WizardStep::Review => StepView::Review { form },
    }
}

fn field_views(record: &EducationRecord) -> Vec<FieldView<'_>> {
    record
        .level
        .required_fields()
        .iter()
        .map(|f| FieldView {
            field: *f,
            label: f.label(),
            value: record.get(*f),
        })
        .collect()
}

pub fn render(wizard: &Wizard) -> WizardView<'_> {
    let seq = wizard.sequencer();
    let step = seq.current_step();
    WizardView {
        job_id: wizard.job_id(),
        step_index: seq.index(),
        total_steps: seq.len(),
        step,
        pages: seq
            .pages()
            .iter()
            .enumerate()
            .map(|(i, s)| PageTab {
                index: i,
                title: s.title(),
                completed: seq.is_completed(*s),
                current: i == seq.index(),
            })
            .collect(),
        content: render_step(step, wizard.form()),
        submission: wizard.submission_status(),
    }
}
