//! services/cv_service/src/adapters/analysis_llm.rs
//!
//! This module contains the adapter for the CV grading LLM.
//! It implements the `CvAnalysisService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = r#"You are an experienced recruiter reviewing a CV.

Grade the CV you receive as JSON and reply with a single JSON object, nothing else:

{
  "score": <integer 0-100, overall quality>,
  "sectionFeedback": [
    {
      "name": "<section: general | personal | experience | education | skills | summary>",
      "score": <integer 0-100>,
      "status": "<good | needs_improvement | missing>",
      "feedback": "<one or two sentences>"
    }
  ],
  "suggestions": ["<short, concrete improvement>", "..."]
}

Guidance:
- Reward quantified achievements, clear role descriptions and a focused summary.
- Mark a section "missing" when it is empty, "needs_improvement" when it is thin or vague.
- Keep suggestions actionable and specific to this CV. At most five.
- Do not wrap the JSON in markdown fences and do not add commentary."#;

use async_openai::{
    config::OpenAIConfig, error::OpenAIError, types::responses::CreateResponseArgs, Client,
};
use async_trait::async_trait;
use cv_builder_core::{
    CvAnalysis, CvAnalysisService, CvDocument, FeedbackStatus, PortError, PortResult,
    SectionFeedback,
};
use serde::Deserialize;
use tracing::debug;

use super::extract_json_block;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CvAnalysisService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAnalysisAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAnalysisAdapter {
    /// Creates a new `OpenAiAnalysisAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// Reply parsing
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisReply {
    score: f64,
    #[serde(default)]
    section_feedback: Vec<SectionReply>,
    #[serde(default)]
    suggestions: Vec<String>,
}

#[derive(Deserialize)]
struct SectionReply {
    name: String,
    score: f64,
    status: FeedbackStatus,
    #[serde(default)]
    feedback: String,
}

fn to_score(value: f64, what: &str) -> PortResult<u8> {
    if !(0.0..=100.0).contains(&value) {
        return Err(PortError::InvalidResponse(format!(
            "{what} score {value} is outside 0..=100"
        )));
    }
    Ok(value.round() as u8)
}

/// Parses the model's reply into a `CvAnalysis`, tolerating surrounding prose or fences.
pub fn parse_analysis(raw: &str) -> PortResult<CvAnalysis> {
    let json = extract_json_block(raw, '{', '}').ok_or_else(|| {
        PortError::InvalidResponse("analysis reply contained no JSON object".to_string())
    })?;
    let reply: AnalysisReply =
        serde_json::from_str(json).map_err(|e| PortError::InvalidResponse(e.to_string()))?;

    let section_feedback = reply
        .section_feedback
        .into_iter()
        .map(|s| {
            Ok(SectionFeedback {
                score: to_score(s.score, &s.name)?,
                name: s.name,
                status: s.status,
                feedback: s.feedback,
            })
        })
        .collect::<PortResult<Vec<_>>>()?;

    Ok(CvAnalysis {
        score: to_score(reply.score, "overall")?,
        section_feedback,
        suggestions: reply
            .suggestions
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    })
}

//=========================================================================================
// `CvAnalysisService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CvAnalysisService for OpenAiAnalysisAdapter {
    async fn analyze(&self, document: &CvDocument) -> PortResult<CvAnalysis> {
        let cv_json = serde_json::to_string_pretty(document)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let request = CreateResponseArgs::default()
            .model(&self.model)
            .instructions(SYSTEM_INSTRUCTIONS)
            .input(format!("CV:\n{}", cv_json))
            .max_output_tokens(1500u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .responses()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let raw = response.output_text().unwrap_or_default();
        debug!(chars = raw.len(), "Received analysis reply");
        parse_analysis(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_reply() {
        let raw = r#"{
            "score": 78.6,
            "sectionFeedback": [
                {"name": "summary", "score": 40, "status": "needs_improvement", "feedback": "Too generic."}
            ],
            "suggestions": ["Quantify your impact", "  "]
        }"#;

        let analysis = parse_analysis(raw).unwrap();

        assert_eq!(analysis.score, 79);
        assert_eq!(analysis.section_feedback[0].status, FeedbackStatus::NeedsImprovement);
        assert_eq!(analysis.suggestions, vec!["Quantify your impact"]);
    }

    #[test]
    fn tolerates_fences_and_unknown_statuses() {
        let raw = "```json\n{\"score\": 55, \"sectionFeedback\": [{\"name\": \"skills\", \"score\": 60, \"status\": \"okay\"}]}\n```";

        let analysis = parse_analysis(raw).unwrap();

        assert_eq!(analysis.score, 55);
        assert_eq!(analysis.section_feedback[0].status, FeedbackStatus::Other);
        assert!(analysis.suggestions.is_empty());
    }

    #[test]
    fn rejects_out_of_range_or_missing_scores() {
        assert!(matches!(
            parse_analysis(r#"{"score": 120}"#),
            Err(PortError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_analysis(r#"{"suggestions": []}"#),
            Err(PortError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_analysis("I cannot grade this."),
            Err(PortError::InvalidResponse(_))
        ));
    }
}
