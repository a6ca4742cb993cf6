pub mod achievements_llm;
pub mod analysis_llm;
pub mod db;

pub use achievements_llm::OpenAiAchievementAdapter;
pub use analysis_llm::OpenAiAnalysisAdapter;
pub use db::PgCvRepository;

/// Returns the outermost `open`..`close` span of a model reply, skipping any prose or
/// markdown fences around it.
pub(crate) fn extract_json_block(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    (end > start).then(|| &raw[start..=end])
}
