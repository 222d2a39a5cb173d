//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::analysis::orchestrator::analyze_resume;
use crate::analysis::store::get_analysis;
use crate::auth::bearer_token;
use crate::errors::AppError;
use crate::models::resume::AnalysisRow;
use crate::state::AppState;

/// Body of POST /api/v1/resumes/analyze. Both fields are required; they are
/// optional here so absence maps to a 400 instead of a deserialization error.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, rename = "resumeText")]
    pub resume_text: Option<String>,
    #[serde(default, rename = "resumeId")]
    pub resume_id: Option<Uuid>,
}

impl AnalyzeRequest {
    /// Presence validation. Runs before the billable generation call;
    /// whitespace-only text counts as missing.
    pub fn validated(&self) -> Result<(&str, Uuid), AppError> {
        let resume_text = self
            .resume_text
            .as_deref()
            .filter(|text| !text.trim().is_empty());
        match (resume_text, self.resume_id) {
            (Some(text), Some(id)) => Ok((text, id)),
            _ => Err(AppError::Validation("Missing required fields".to_string())),
        }
    }
}

/// POST /api/v1/resumes/analyze
///
/// Authenticates the caller, validates the payload, then runs one analysis
/// and returns the persisted record including its generated id.
pub async fn handle_analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisRow>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let user = state.auth.verify(token).await?;

    let (resume_text, resume_id) = request.validated()?;

    let analysis = analyze_resume(&state.db, &state.llm, user.id, resume_id, resume_text).await?;

    Ok(Json(analysis))
}

/// GET /api/v1/analyses/:id
///
/// Returns one stored analysis. Lookups are scoped to the authenticated
/// user, so another user's analysis id reads as not found.
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(analysis_id): Path<Uuid>,
) -> Result<Json<AnalysisRow>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let user = state.auth.verify(token).await?;

    let analysis = get_analysis(&state.db, analysis_id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Analysis {analysis_id} not found")))?;

    Ok(Json(analysis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_accepts_complete_request() {
        let request = AnalyzeRequest {
            resume_text: Some("Jane Doe, Rust Engineer".to_string()),
            resume_id: Some(Uuid::new_v4()),
        };
        assert!(request.validated().is_ok());
    }

    #[test]
    fn test_missing_resume_id_is_rejected() {
        let request = AnalyzeRequest {
            resume_text: Some("text".to_string()),
            resume_id: None,
        };
        let error = request.validated().unwrap_err();
        assert!(matches!(error, AppError::Validation(msg) if msg == "Missing required fields"));
    }

    #[test]
    fn test_missing_resume_text_is_rejected() {
        let request = AnalyzeRequest {
            resume_text: None,
            resume_id: Some(Uuid::new_v4()),
        };
        assert!(request.validated().is_err());
    }

    #[test]
    fn test_blank_resume_text_counts_as_missing() {
        let request = AnalyzeRequest {
            resume_text: Some("   \n".to_string()),
            resume_id: Some(Uuid::new_v4()),
        };
        assert!(request.validated().is_err());
    }

    #[test]
    fn test_request_field_names_are_camel_case() {
        let request: AnalyzeRequest = serde_json::from_str(
            r#"{"resumeText": "text", "resumeId": "00000000-0000-0000-0000-000000000000"}"#,
        )
        .unwrap();
        assert!(request.validated().is_ok());
    }
}
