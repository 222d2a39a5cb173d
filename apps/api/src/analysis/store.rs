//! Persistence gateway for validated analysis results.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::analysis::parser::ParsedAnalysis;
use crate::errors::AppError;
use crate::models::resume::AnalysisRow;

/// Inserts one validated analysis keyed by `(resume_id, user_id)`.
///
/// Ownership is enforced here, not assumed by the orchestrator: the write is
/// rejected when the resume does not exist or belongs to another user.
pub async fn insert_analysis(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
    analysis: &ParsedAnalysis,
) -> Result<AnalysisRow, AppError> {
    let owner: Option<Uuid> = sqlx::query_scalar("SELECT user_id FROM resumes WHERE id = $1")
        .bind(resume_id)
        .fetch_optional(pool)
        .await?;

    match owner {
        Some(owner) if owner == user_id => {}
        _ => {
            return Err(AppError::Persistence(format!(
                "resume {resume_id} does not exist or does not belong to user {user_id}"
            )))
        }
    }

    let skills = serde_json::to_value(&analysis.skills)
        .map_err(|e| AppError::Persistence(format!("skills serialization failed: {e}")))?;

    let row = sqlx::query_as::<_, AnalysisRow>(
        r#"
        INSERT INTO resume_analyses
            (resume_id, user_id, skills, experience_summary, strengths, improvements, ats_score)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(resume_id)
    .bind(user_id)
    .bind(skills)
    .bind(&analysis.experience_summary)
    .bind(&analysis.strengths)
    .bind(&analysis.improvements)
    .bind(analysis.ats_score)
    .fetch_one(pool)
    .await?;

    info!("Analysis saved successfully: {}", row.id);
    Ok(row)
}

/// Fetches one stored analysis, visible only to its owning user.
pub async fn get_analysis(
    pool: &PgPool,
    analysis_id: Uuid,
    user_id: Uuid,
) -> Result<Option<AnalysisRow>, AppError> {
    Ok(sqlx::query_as::<_, AnalysisRow>(
        "SELECT * FROM resume_analyses WHERE id = $1 AND user_id = $2",
    )
    .bind(analysis_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}
