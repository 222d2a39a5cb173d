//! One analysis run: prompt, invoke, parse, persist.
//!
//! Stateless by design; every input arrives as an explicit parameter and any
//! number of requests may run concurrently.

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::parser::parse_analysis;
use crate::analysis::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM};
use crate::analysis::store::insert_analysis;
use crate::errors::AppError;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::resume::AnalysisRow;

/// Runs the full pipeline for one already-authenticated, already-validated
/// request. Rate-limit and quota signals from the generation service pass
/// through unchanged; nothing is written unless parsing succeeds.
pub async fn analyze_resume(
    pool: &PgPool,
    llm: &LlmClient,
    user_id: Uuid,
    resume_id: Uuid,
    resume_text: &str,
) -> Result<AnalysisRow, AppError> {
    info!("Analyzing resume {resume_id} for user {user_id}");

    let prompt = build_analysis_prompt(resume_text);
    let response = llm.call(&prompt, ANALYSIS_SYSTEM).await?;

    let raw_text = response
        .text()
        .ok_or_else(|| AppError::from(LlmError::EmptyContent))?;

    let analysis = parse_analysis(raw_text).map_err(|e| {
        warn!("Rejected generation output for resume {resume_id}: {e}");
        AppError::AnalysisFormat(e.to_string())
    })?;

    insert_analysis(pool, resume_id, user_id, &analysis).await
}
