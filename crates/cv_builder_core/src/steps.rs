//! crates/cv_builder_core/src/steps.rs
//!
//! The fixed, ordered table of wizard steps. Adding or removing a step is an edit to
//! [`STEPS`] and to [`WizardStep`], nothing else.

use serde::{Deserialize, Serialize};

use crate::domain::CvDocument;
use crate::validation::{self, ValidationIssue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    General,
    Personal,
    Experience,
    Education,
    Skills,
    Summary,
    Grade,
}

/// Everything the engine needs to know about one step.
pub struct StepDefinition {
    pub step: WizardStep,
    /// Stable identifier shared with the caller.
    pub id: &'static str,
    /// Render hint for the caller's step header.
    pub title: &'static str,
    pub validate: fn(&CvDocument) -> Result<(), ValidationIssue>,
}

pub const STEPS: [StepDefinition; 7] = [
    StepDefinition {
        step: WizardStep::General,
        id: "general",
        title: "General",
        validate: validation::general,
    },
    StepDefinition {
        step: WizardStep::Personal,
        id: "personal",
        title: "Personal Info",
        validate: validation::personal,
    },
    StepDefinition {
        step: WizardStep::Experience,
        id: "experience",
        title: "Work Experience",
        validate: validation::experience,
    },
    StepDefinition {
        step: WizardStep::Education,
        id: "education",
        title: "Education",
        validate: validation::education,
    },
    StepDefinition {
        step: WizardStep::Skills,
        id: "skills",
        title: "Skills",
        validate: validation::skills,
    },
    StepDefinition {
        step: WizardStep::Summary,
        id: "summary",
        title: "Summary",
        validate: validation::summary,
    },
    StepDefinition {
        step: WizardStep::Grade,
        id: "grade",
        title: "Grade",
        validate: validation::grade,
    },
];

pub const STEP_COUNT: usize = STEPS.len();

impl WizardStep {
    pub const LAST: WizardStep = WizardStep::Grade;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        STEPS.get(index).map(|d| d.step)
    }

    pub fn from_id(id: &str) -> Option<Self> {
        STEPS.iter().find(|d| d.id == id).map(|d| d.step)
    }

    pub fn definition(self) -> &'static StepDefinition {
        &STEPS[self.index()]
    }

    pub fn id(self) -> &'static str {
        self.definition().id
    }

    pub fn title(self) -> &'static str {
        self.definition().title
    }

    pub fn all() -> impl Iterator<Item = WizardStep> {
        STEPS.iter().map(|d| d.step)
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
