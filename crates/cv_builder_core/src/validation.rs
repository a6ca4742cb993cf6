//! crates/cv_builder_core/src/validation.rs
//!
//! Pure per-step completeness checks. Failures carry a reason code rather than a
//! message so the caller can localize them.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::{CvDocument, Education, TimelineEntry, WorkExperience};
use crate::steps::WizardStep;

/// Why a step cannot be left yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    JobTitleRequired,
    DescriptionRequired,
    FirstNameRequired,
    LastNameRequired,
    EmailRequired,
    EmailInvalid,
    ExperienceJobTitleRequired,
    ExperienceCompanyRequired,
    ExperienceStartDateRequired,
    ExperienceEndDateRequired,
    EducationDegreeRequired,
    EducationInstitutionRequired,
    EducationStartDateRequired,
    EducationEndDateRequired,
    SkillsRequired,
    SummaryRequired,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::JobTitleRequired => "job_title_required",
            ReasonCode::DescriptionRequired => "description_required",
            ReasonCode::FirstNameRequired => "first_name_required",
            ReasonCode::LastNameRequired => "last_name_required",
            ReasonCode::EmailRequired => "email_required",
            ReasonCode::EmailInvalid => "email_invalid",
            ReasonCode::ExperienceJobTitleRequired => "experience_job_title_required",
            ReasonCode::ExperienceCompanyRequired => "experience_company_required",
            ReasonCode::ExperienceStartDateRequired => "experience_start_date_required",
            ReasonCode::ExperienceEndDateRequired => "experience_end_date_required",
            ReasonCode::EducationDegreeRequired => "education_degree_required",
            ReasonCode::EducationInstitutionRequired => "education_institution_required",
            ReasonCode::EducationStartDateRequired => "education_start_date_required",
            ReasonCode::EducationEndDateRequired => "education_end_date_required",
            ReasonCode::SkillsRequired => "skills_required",
            ReasonCode::SummaryRequired => "summary_required",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed check. `entry` is the list position for experience and education rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub reason: ReasonCode,
    pub entry: Option<usize>,
}

impl ValidationIssue {
    fn new(reason: ReasonCode) -> Self {
        Self {
            reason,
            entry: None,
        }
    }

    fn at(reason: ReasonCode, entry: usize) -> Self {
        Self {
            reason,
            entry: Some(entry),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.entry {
            Some(entry) => write!(f, "{} (entry {})", self.reason, entry),
            None => write!(f, "{}", self.reason),
        }
    }
}

/// Checks whether `document` satisfies the rules for leaving `step`.
pub fn validate(step: WizardStep, document: &CvDocument) -> Result<(), ValidationIssue> {
    (step.definition().validate)(document)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn require(value: &str, reason: ReasonCode) -> Result<(), ValidationIssue> {
    if is_blank(value) {
        Err(ValidationIssue::new(reason))
    } else {
        Ok(())
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern is a valid regex")
    })
}

pub fn is_valid_email(value: &str) -> bool {
    email_pattern().is_match(value.trim())
}

pub(crate) fn general(document: &CvDocument) -> Result<(), ValidationIssue> {
    require(&document.job_title, ReasonCode::JobTitleRequired)?;
    require(&document.description, ReasonCode::DescriptionRequired)
}

pub(crate) fn personal(document: &CvDocument) -> Result<(), ValidationIssue> {
    require(&document.first_name, ReasonCode::FirstNameRequired)?;
    require(&document.last_name, ReasonCode::LastNameRequired)?;
    require(&document.email, ReasonCode::EmailRequired)?;
    if !is_valid_email(&document.email) {
        return Err(ValidationIssue::new(ReasonCode::EmailInvalid));
    }
    Ok(())
}

fn check_experience(entry: &WorkExperience) -> Result<(), ReasonCode> {
    if is_blank(&entry.job_title) {
        return Err(ReasonCode::ExperienceJobTitleRequired);
    }
    if is_blank(&entry.company) {
        return Err(ReasonCode::ExperienceCompanyRequired);
    }
    if is_blank(&entry.start_date) {
        return Err(ReasonCode::ExperienceStartDateRequired);
    }
    if entry.effective_end_date().is_some_and(is_blank) {
        return Err(ReasonCode::ExperienceEndDateRequired);
    }
    Ok(())
}

fn check_education(entry: &Education) -> Result<(), ReasonCode> {
    if is_blank(&entry.degree) {
        return Err(ReasonCode::EducationDegreeRequired);
    }
    if is_blank(&entry.institution) {
        return Err(ReasonCode::EducationInstitutionRequired);
    }
    if is_blank(&entry.start_date) {
        return Err(ReasonCode::EducationStartDateRequired);
    }
    if entry.effective_end_date().is_some_and(is_blank) {
        return Err(ReasonCode::EducationEndDateRequired);
    }
    Ok(())
}

pub(crate) fn experience(document: &CvDocument) -> Result<(), ValidationIssue> {
    document
        .work_experiences
        .iter()
        .enumerate()
        .try_for_each(|(i, e)| check_experience(e).map_err(|r| ValidationIssue::at(r, i)))
}

pub(crate) fn education(document: &CvDocument) -> Result<(), ValidationIssue> {
    document
        .educations
        .iter()
        .enumerate()
        .try_for_each(|(i, e)| check_education(e).map_err(|r| ValidationIssue::at(r, i)))
}

pub(crate) fn skills(document: &CvDocument) -> Result<(), ValidationIssue> {
    if document.skills.iter().all(|s| is_blank(s)) {
        return Err(ValidationIssue::new(ReasonCode::SkillsRequired));
    }
    Ok(())
}

pub(crate) fn summary(document: &CvDocument) -> Result<(), ValidationIssue> {
    require(&document.summary, ReasonCode::SummaryRequired)
}

/// The grade step has no document precondition; leaving it is the analysis gate's concern.
pub(crate) fn grade(_document: &CvDocument) -> Result<(), ValidationIssue> {
    Ok(())
}
