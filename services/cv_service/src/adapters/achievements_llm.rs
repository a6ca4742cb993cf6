//! services/cv_service/src/adapters/achievements_llm.rs
//!
//! This module contains the adapter for the achievement-writing LLM.
//! It implements the `AchievementSuggestionService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig, error::OpenAIError, types::responses::CreateResponseArgs, Client,
};
use async_trait::async_trait;
use cv_builder_core::{AchievementSuggestionService, PortError, PortResult, WorkExperience};

use super::extract_json_block;

/// An adapter that implements `AchievementSuggestionService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAchievementAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAchievementAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

fn describe(experience: &WorkExperience) -> String {
    let period = match (experience.current, experience.end_date.trim()) {
        (true, _) => format!("{} - present", experience.start_date),
        (false, "") => experience.start_date.clone(),
        (false, end) => format!("{} - {}", experience.start_date, end),
    };
    let existing: Vec<&str> = experience
        .achievements
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .collect();

    format!(
        "ROLE: {}\nCOMPANY: {}\nPERIOD: {}\nDESCRIPTION: {}\nEXISTING ACHIEVEMENTS: {}",
        experience.job_title,
        experience.company,
        period,
        experience.description,
        if existing.is_empty() {
            "none".to_string()
        } else {
            existing.join("; ")
        }
    )
}

/// Parses a JSON array of strings out of the model's reply.
pub fn parse_achievements(raw: &str) -> PortResult<Vec<String>> {
    let json = extract_json_block(raw, '[', ']').ok_or_else(|| {
        PortError::InvalidResponse("achievement reply contained no JSON array".to_string())
    })?;
    let items: Vec<String> =
        serde_json::from_str(json).map_err(|e| PortError::InvalidResponse(e.to_string()))?;
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

#[async_trait]
impl AchievementSuggestionService for OpenAiAchievementAdapter {
    async fn suggest_achievements(&self, experience: &WorkExperience) -> PortResult<Vec<String>> {
        let request = CreateResponseArgs::default()
            .model(&self.model)
            .instructions(
                "You write CV achievement bullet points. Given one role, propose three concise, \
                 results-oriented achievements in the first person without pronouns, each under \
                 25 words, that do not repeat the existing ones. Reply with ONLY a JSON array of \
                 strings.",
            )
            .input(describe(experience))
            .max_output_tokens(400u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .responses()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        parse_achievements(&response.output_text().unwrap_or_default())
    }
}
