//! services/cv_service/src/bin/regrade.rs
//!
//! Re-runs the analysis for stored CVs and saves each one back as `Completed`.
//!
//! Usage: `regrade <cv-id> [<cv-id> ...]`

use async_openai::{config::OpenAIConfig, Client};
use cv_builder_core::{SaveIntent, WizardSession, WizardStep};
use cv_service_lib::{
    adapters::{analysis_llm::OpenAiAnalysisAdapter, db::PgCvRepository},
    config::Config,
    connect,
    error::ServiceError,
    init_tracing,
};
use tracing::{error, info};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    init_tracing(&config);

    let ids = std::env::args()
        .skip(1)
        .map(|arg| {
            Uuid::parse_str(&arg)
                .map_err(|e| ServiceError::Internal(format!("'{}' is not a CV id: {}", arg, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if ids.is_empty() {
        return Err(ServiceError::Internal(
            "usage: regrade <cv-id> [<cv-id> ...]".to_string(),
        ));
    }

    // --- 2. Initialize Adapters ---
    let repository = PgCvRepository::new(connect(&config).await?);
    let openai_config = OpenAIConfig::new().with_api_key(config.require_openai_api_key()?);
    let analyzer =
        OpenAiAnalysisAdapter::new(Client::with_config(openai_config), config.analysis_model.clone());

    // --- 3. Grade each CV ---
    let mut failures = 0usize;
    for id in ids {
        match regrade(&repository, &analyzer, id).await {
            Ok(score) => info!(%id, score, "Regraded CV"),
            Err(e) => {
                failures += 1;
                error!(%id, "Failed to regrade CV: {e}");
            }
        }
    }

    if failures > 0 {
        return Err(ServiceError::Internal(format!("{} CV(s) could not be regraded", failures)));
    }
    Ok(())
}

async fn regrade(
    repository: &PgCvRepository,
    analyzer: &OpenAiAnalysisAdapter,
    id: Uuid,
) -> Result<u8, ServiceError> {
    let mut session = WizardSession::open(repository, id).await?;
    // Drafts only unlock the grade step once every earlier step passes.
    while session.current_step() != WizardStep::Grade {
        if session.jump_to(WizardStep::Grade.index()).is_ok() {
            break;
        }
        session.next()?;
    }

    let score = session.run_analysis(analyzer).await?.score;
    session.save(repository, SaveIntent::Completed).await?;
    Ok(score)
}
