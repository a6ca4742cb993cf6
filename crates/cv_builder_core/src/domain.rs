//! crates/cv_builder_core/src/domain.rs
//!
//! Defines the pure, core data structures for the CV builder.
//! The document model accepts any partial state: field presence is checked by the
//! step validator, never here, so intermediate typing never fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// CV Document
//=========================================================================================

/// The CV being assembled by the wizard.
///
/// Empty strings stand for "not filled in yet". Collection order is meaningful: it is the
/// order sections are rendered in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvDocument {
    pub job_title: String,
    pub description: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub website: String,
    pub summary: String,
    pub work_experiences: Vec<WorkExperience>,
    pub educations: Vec<Education>,
    pub skills: Vec<String>,
}

/// A shallow patch over the top-level fields of a [`CvDocument`].
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvPatch {
    pub job_title: Option<String>,
    pub description: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub summary: Option<String>,
    pub work_experiences: Option<Vec<WorkExperience>>,
    pub educations: Option<Vec<Education>>,
    pub skills: Option<Vec<String>>,
}

fn merge<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

/// A patch value for a nullable field.
///
/// - omitted => `Unset`, keep the current value
/// - `null` => `Null`, clear it
/// - value => `Value(v)`, replace it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatchField<T> {
    #[serde(skip)]
    Unset,
    Null,
    Value(T),
}

impl<T> Default for PatchField<T> {
    fn default() -> Self {
        PatchField::Unset
    }
}

impl<T> PatchField<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, PatchField::Unset)
    }
}

fn merge_nullable<T: Clone>(target: &mut Option<T>, value: &PatchField<T>) {
    match value {
        PatchField::Unset => {}
        PatchField::Null => *target = None,
        PatchField::Value(v) => *target = Some(v.clone()),
    }
}

impl CvDocument {
    /// Returns a new document with every `Some` field of `patch` replacing the current value.
    pub fn apply_patch(&self, patch: &CvPatch) -> CvDocument {
        let mut next = self.clone();
        merge(&mut next.job_title, &patch.job_title);
        merge(&mut next.description, &patch.description);
        merge(&mut next.first_name, &patch.first_name);
        merge(&mut next.last_name, &patch.last_name);
        merge(&mut next.email, &patch.email);
        merge(&mut next.phone, &patch.phone);
        merge(&mut next.location, &patch.location);
        merge(&mut next.linkedin, &patch.linkedin);
        merge(&mut next.website, &patch.website);
        merge(&mut next.summary, &patch.summary);
        merge(&mut next.work_experiences, &patch.work_experiences);
        merge(&mut next.educations, &patch.educations);
        merge(&mut next.skills, &patch.skills);
        next
    }

    // --- Work experience ---

    /// Appends an empty entry with a fresh id and returns that id.
    pub fn add_work_experience(&mut self) -> Uuid {
        add_entry(&mut self.work_experiences)
    }

    /// Merges `patch` into the entry with `id`. Returns `false` when no entry matched.
    pub fn update_work_experience(&mut self, id: Uuid, patch: &WorkExperiencePatch) -> bool {
        update_entry(&mut self.work_experiences, id, patch)
    }

    pub fn remove_work_experience(&mut self, id: Uuid) -> bool {
        remove_entry(&mut self.work_experiences, id)
    }

    pub fn work_experience(&self, id: Uuid) -> Option<&WorkExperience> {
        self.work_experiences.iter().find(|e| e.id == id)
    }

    // --- Achievements ---

    /// Appends an empty achievement placeholder to the experience with `id`.
    pub fn add_achievement(&mut self, experience_id: Uuid) -> bool {
        match self.work_experience_mut(experience_id) {
            Some(experience) => {
                experience.achievements.push(String::new());
                true
            }
            None => false,
        }
    }

    pub fn update_achievement(&mut self, experience_id: Uuid, index: usize, text: &str) -> bool {
        let Some(slot) = self
            .work_experience_mut(experience_id)
            .and_then(|e| e.achievements.get_mut(index))
        else {
            return false;
        };
        if slot.as_str() == text {
            return false;
        }
        *slot = text.to_string();
        true
    }

    pub fn remove_achievement(&mut self, experience_id: Uuid, index: usize) -> bool {
        match self.work_experience_mut(experience_id) {
            Some(experience) if index < experience.achievements.len() => {
                experience.achievements.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Writes `suggestions` into the empty placeholders of the experience first, then
    /// appends whatever is left. Blank suggestions are ignored.
    pub fn fill_achievements(&mut self, experience_id: Uuid, suggestions: &[String]) -> bool {
        let Some(experience) = self.work_experience_mut(experience_id) else {
            return false;
        };
        let mut incoming = suggestions
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty());
        let mut changed = false;

        for slot in experience
            .achievements
            .iter_mut()
            .filter(|a| a.trim().is_empty())
        {
            match incoming.next() {
                Some(text) => {
                    *slot = text.to_string();
                    changed = true;
                }
                None => break,
            }
        }
        for text in incoming {
            experience.achievements.push(text.to_string());
            changed = true;
        }
        changed
    }

    fn work_experience_mut(&mut self, id: Uuid) -> Option<&mut WorkExperience> {
        self.work_experiences.iter_mut().find(|e| e.id == id)
    }

    // --- Education ---

    pub fn add_education(&mut self) -> Uuid {
        add_entry(&mut self.educations)
    }

    pub fn update_education(&mut self, id: Uuid, patch: &EducationPatch) -> bool {
        update_entry(&mut self.educations, id, patch)
    }

    pub fn remove_education(&mut self, id: Uuid) -> bool {
        remove_entry(&mut self.educations, id)
    }

    // --- Skills ---

    /// Appends `value` (trimmed) unless it is blank or already present.
    /// De-duplication is an exact, case-sensitive match.
    pub fn add_skill(&mut self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() || self.skills.iter().any(|s| s == value) {
            return false;
        }
        self.skills.push(value.to_string());
        true
    }

    /// Removes the first exact match of `value`.
    pub fn remove_skill(&mut self, value: &str) -> bool {
        let value = value.trim();
        match self.skills.iter().position(|s| s == value) {
            Some(index) => {
                self.skills.remove(index);
                true
            }
            None => false,
        }
    }
}

//=========================================================================================
// Work Experience & Education entries
//=========================================================================================

/// One employment entry. Dates are `YYYY-MM` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub id: Uuid,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperiencePatch {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
    pub achievements: Option<Vec<String>>,
}

/// One academic entry. Dates are `YYYY-MM` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: Uuid,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub gpa: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationPatch {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current: Option<bool>,
    #[serde(skip_serializing_if = "PatchField::is_unset")]
    pub gpa: PatchField<String>,
    #[serde(skip_serializing_if = "PatchField::is_unset")]
    pub description: PatchField<String>,
}

/// Shared behaviour of the dated, id-keyed list entries.
///
/// `current == true` is authoritative: an ongoing entry has no effective end date even if
/// one is still stored, and setting `current` clears the stored end date.
pub trait TimelineEntry {
    type Patch;

    fn blank(id: Uuid) -> Self;
    fn id(&self) -> Uuid;
    fn is_current(&self) -> bool;
    fn stored_end_date(&self) -> &str;
    /// Merges `patch`, returning whether anything changed.
    fn apply(&mut self, patch: &Self::Patch) -> bool;

    fn effective_end_date(&self) -> Option<&str> {
        if self.is_current() {
            None
        } else {
            Some(self.stored_end_date())
        }
    }
}

impl TimelineEntry for WorkExperience {
    type Patch = WorkExperiencePatch;

    fn blank(id: Uuid) -> Self {
        Self {
            id,
            job_title: String::new(),
            company: String::new(),
            location: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            current: false,
            description: String::new(),
            achievements: Vec::new(),
        }
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn is_current(&self) -> bool {
        self.current
    }

    fn stored_end_date(&self) -> &str {
        &self.end_date
    }

    fn apply(&mut self, patch: &WorkExperiencePatch) -> bool {
        let before = self.clone();
        merge(&mut self.job_title, &patch.job_title);
        merge(&mut self.company, &patch.company);
        merge(&mut self.location, &patch.location);
        merge(&mut self.start_date, &patch.start_date);
        merge(&mut self.end_date, &patch.end_date);
        merge(&mut self.current, &patch.current);
        merge(&mut self.description, &patch.description);
        merge(&mut self.achievements, &patch.achievements);
        if self.current {
            self.end_date.clear();
        }
        *self != before
    }
}

impl TimelineEntry for Education {
    type Patch = EducationPatch;

    fn blank(id: Uuid) -> Self {
        Self {
            id,
            degree: String::new(),
            institution: String::new(),
            location: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            current: false,
            gpa: None,
            description: None,
        }
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn is_current(&self) -> bool {
        self.current
    }

    fn stored_end_date(&self) -> &str {
        &self.end_date
    }

    fn apply(&mut self, patch: &EducationPatch) -> bool {
        let before = self.clone();
        merge(&mut self.degree, &patch.degree);
        merge(&mut self.institution, &patch.institution);
        merge(&mut self.location, &patch.location);
        merge(&mut self.start_date, &patch.start_date);
        merge(&mut self.end_date, &patch.end_date);
        merge(&mut self.current, &patch.current);
        merge_nullable(&mut self.gpa, &patch.gpa);
        merge_nullable(&mut self.description, &patch.description);
        if self.current {
            self.end_date.clear();
        }
        *self != before
    }
}

fn add_entry<E: TimelineEntry>(entries: &mut Vec<E>) -> Uuid {
    let id = Uuid::new_v4();
    entries.push(E::blank(id));
    id
}

fn update_entry<E: TimelineEntry>(entries: &mut [E], id: Uuid, patch: &E::Patch) -> bool {
    entries
        .iter_mut()
        .find(|e| e.id() == id)
        .map(|e| e.apply(patch))
        .unwrap_or(false)
}

fn remove_entry<E: TimelineEntry>(entries: &mut Vec<E>, id: Uuid) -> bool {
    let before = entries.len();
    entries.retain(|e| e.id() != id);
    entries.len() != before
}

//=========================================================================================
// Lifecycle & Storage
//=========================================================================================

/// Persistence status of a CV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CvStatus {
    #[default]
    Draft,
    Completed,
}

impl CvStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CvStatus::Draft => "Draft",
            CvStatus::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for CvStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CvStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(CvStatus::Draft),
            "Completed" => Ok(CvStatus::Completed),
            other => Err(format!("unknown CV status '{other}'")),
        }
    }
}

/// A CV as held by the document store.
#[derive(Debug, Clone, PartialEq)]
pub struct CvRecord {
    pub id: Uuid,
    pub document: CvDocument,
    pub status: CvStatus,
    pub score: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The payload of a first write. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCv {
    pub document: CvDocument,
    pub status: CvStatus,
    pub score: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The partial payload of every later write. `created_at` is deliberately absent.
#[derive(Debug, Clone, PartialEq)]
pub struct CvUpdate {
    pub document: CvDocument,
    pub status: CvStatus,
    pub score: Option<u8>,
    pub updated_at: DateTime<Utc>,
}

//=========================================================================================
// Analysis results
//=========================================================================================

/// The grade returned by the analysis collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvAnalysis {
    pub score: u8,
    #[serde(default)]
    pub section_feedback: Vec<SectionFeedback>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionFeedback {
    pub name: String,
    pub score: u8,
    pub status: FeedbackStatus,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    Good,
    NeedsImprovement,
    Missing,
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_patch_only_touches_provided_fields() {
        let doc = CvDocument {
            job_title: "Engineer".into(),
            summary: "old".into(),
            ..Default::default()
        };
        let next = doc.apply_patch(&CvPatch {
            summary: Some("new".into()),
            ..Default::default()
        });

        assert_eq!(next.job_title, "Engineer");
        assert_eq!(next.summary, "new");
        assert_eq!(doc.summary, "old");
    }

    #[test]
    fn removing_an_experience_keeps_the_order_of_the_rest() {
        let mut doc = CvDocument::default();
        let a = doc.add_work_experience();
        let b = doc.add_work_experience();
        let c = doc.add_work_experience();

        assert!(doc.remove_work_experience(b));
        assert!(!doc.remove_work_experience(b));

        let ids: Vec<Uuid> = doc.work_experiences.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn updating_a_missing_entry_is_a_no_op() {
        let mut doc = CvDocument::default();
        doc.add_education();
        let before = doc.clone();

        let changed = doc.update_education(
            Uuid::new_v4(),
            &EducationPatch {
                degree: Some("BSc".into()),
                ..Default::default()
            },
        );

        assert!(!changed);
        assert_eq!(doc, before);
    }

    #[test]
    fn marking_an_entry_current_clears_its_end_date() {
        let mut doc = CvDocument::default();
        let id = doc.add_work_experience();
        doc.update_work_experience(
            id,
            &WorkExperiencePatch {
                end_date: Some("2023-05".into()),
                ..Default::default()
            },
        );
        doc.update_work_experience(
            id,
            &WorkExperiencePatch {
                current: Some(true),
                ..Default::default()
            },
        );

        let entry = doc.work_experience(id).unwrap();
        assert!(entry.end_date.is_empty());
        assert_eq!(entry.effective_end_date(), None);
    }

    #[test]
    fn json_null_clears_optional_education_fields() {
        let mut doc = CvDocument::default();
        let id = doc.add_education();
        doc.update_education(
            id,
            &EducationPatch {
                gpa: PatchField::Value("3.9".into()),
                description: PatchField::Value("Thesis on compilers".into()),
                ..Default::default()
            },
        );

        let patch: EducationPatch = serde_json::from_str(r#"{"gpa": null}"#).unwrap();
        assert_eq!(patch.gpa, PatchField::Null);
        assert!(patch.description.is_unset());

        assert!(doc.update_education(id, &patch));
        let entry = &doc.educations[0];
        assert_eq!(entry.gpa, None);
        assert_eq!(entry.description.as_deref(), Some("Thesis on compilers"));
    }

    #[test]
    fn education_patch_values_and_omissions_deserialize() {
        let patch: EducationPatch =
            serde_json::from_str(r#"{"degree": "BSc", "description": "Honours"}"#).unwrap();

        assert_eq!(patch.degree.as_deref(), Some("BSc"));
        assert_eq!(patch.description, PatchField::Value("Honours".into()));
        assert!(patch.gpa.is_unset());
        assert_eq!(
            serde_json::to_value(&patch).unwrap()["description"],
            serde_json::json!("Honours")
        );
        assert!(serde_json::to_value(&patch).unwrap().get("gpa").is_none());
    }

    #[test]
    fn marking_an_education_current_clears_its_end_date() {
        let mut doc = CvDocument::default();
        let id = doc.add_education();
        doc.update_education(
            id,
            &EducationPatch {
                end_date: Some("2019-06".into()),
                ..Default::default()
            },
        );

        assert!(doc.update_education(
            id,
            &EducationPatch {
                current: Some(true),
                ..Default::default()
            },
        ));
        assert!(doc.educations[0].end_date.is_empty());
    }

    #[test]
    fn current_wins_over_an_end_date_patched_in_from_outside() {
        let mut entry = Education::blank(Uuid::new_v4());
        entry.current = true;
        entry.end_date = "2020-01".into();

        assert_eq!(entry.effective_end_date(), None);
    }

    #[test]
    fn skills_are_trimmed_and_deduplicated_case_sensitively() {
        let mut doc = CvDocument::default();
        assert!(doc.add_skill(" Rust "));
        assert!(!doc.add_skill("Rust"));
        assert!(!doc.add_skill("   "));
        assert!(doc.add_skill("rust"));

        assert_eq!(doc.skills, vec!["Rust".to_string(), "rust".to_string()]);
    }

    #[test]
    fn add_then_remove_skill_restores_the_list() {
        let mut doc = CvDocument {
            skills: vec!["Go".into(), "SQL".into()],
            ..Default::default()
        };
        let before = doc.skills.clone();

        doc.add_skill("React");
        doc.remove_skill("React");

        assert_eq!(doc.skills, before);
    }

    #[test]
    fn suggestions_fill_placeholders_before_appending() {
        let mut doc = CvDocument::default();
        let id = doc.add_work_experience();
        doc.add_achievement(id);
        doc.update_achievement(id, 0, "Shipped v2");
        doc.add_achievement(id);

        let changed = doc.fill_achievements(
            id,
            &["Cut latency by 40%".to_string(), " ".to_string(), "Led a team of 4".to_string()],
        );

        assert!(changed);
        assert_eq!(
            doc.work_experience(id).unwrap().achievements,
            vec!["Shipped v2", "Cut latency by 40%", "Led a team of 4"]
        );
    }

    #[test]
    fn achievement_edits_out_of_range_are_ignored() {
        let mut doc = CvDocument::default();
        let id = doc.add_work_experience();

        assert!(!doc.update_achievement(id, 3, "x"));
        assert!(!doc.remove_achievement(id, 0));
        assert!(!doc.add_achievement(Uuid::new_v4()));
    }

    #[test]
    fn document_uses_camel_case_and_tolerates_missing_fields() {
        let doc: CvDocument =
            serde_json::from_str(r#"{"jobTitle":"Engineer","skills":["Rust"]}"#).unwrap();

        assert_eq!(doc.job_title, "Engineer");
        assert_eq!(doc.skills, vec!["Rust"]);
        assert!(doc.work_experiences.is_empty());
    }

    #[test]
    fn status_round_trips_through_its_string_form() {
        assert_eq!("Completed".parse::<CvStatus>(), Ok(CvStatus::Completed));
        assert!("done".parse::<CvStatus>().is_err());
        assert_eq!(CvStatus::default(), CvStatus::Draft);
    }
}
