//! Axum route handler for the Upload API, plus the live collaborator
//! implementations the stager is wired with in production.

use async_trait::async_trait;
use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::analysis::orchestrator::analyze_resume;
use crate::auth::bearer_token;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::resume::{AnalysisRow, ResumeRow};
use crate::state::AppState;
use crate::storage::put_resume_blob;
use crate::upload::stager::{
    Analyzer, BlobStore, NewResume, ResumeStore, StagedFile, UploadSession, UploadStager,
};

pub struct S3BlobStore {
    pub client: aws_sdk_s3::Client,
    pub bucket: String,
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, content_type: &str, bytes: &[u8]) -> Result<(), AppError> {
        put_resume_blob(&self.client, &self.bucket, key, content_type, bytes.to_vec()).await
    }
}

pub struct PgResumeStore {
    pub pool: PgPool,
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn insert(&self, new: NewResume) -> Result<ResumeRow, AppError> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (user_id, file_name, file_path, file_size, file_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(&new.file_name)
        .bind(&new.file_path)
        .bind(new.file_size)
        .bind(&new.file_type)
        .fetch_one(&self.pool)
        .await?)
    }
}

pub struct LiveAnalyzer {
    pub pool: PgPool,
    pub llm: LlmClient,
}

#[async_trait]
impl Analyzer for LiveAnalyzer {
    async fn analyze(
        &self,
        user_id: Uuid,
        resume_id: Uuid,
        resume_text: &str,
    ) -> Result<AnalysisRow, AppError> {
        analyze_resume(&self.pool, &self.llm, user_id, resume_id, resume_text).await
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub resume_id: Uuid,
    pub analysis_id: Uuid,
    pub ats_score: i32,
}

/// POST /api/v1/resumes
///
/// Full upload pipeline for one multipart `file` part: validate, store the
/// blob, record metadata, extract text, run the analysis. One classified
/// error surfaces on failure and the client retries from scratch.
pub async fn handle_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let user = state.auth.verify(token).await?;

    let file = read_file_part(multipart).await?;

    let blobs = S3BlobStore {
        client: state.s3.clone(),
        bucket: state.config.s3_bucket.clone(),
    };
    let resumes = PgResumeStore {
        pool: state.db.clone(),
    };
    let analyzer = LiveAnalyzer {
        pool: state.db.clone(),
        llm: state.llm.clone(),
    };
    let stager = UploadStager {
        blobs: &blobs,
        resumes: &resumes,
        extractor: state.extractor.as_ref(),
        analyzer: &analyzer,
    };

    let mut session = UploadSession::new();
    let receipt = stager.run(&mut session, user.id, file).await?;

    Ok(Json(UploadResponse {
        resume_id: receipt.resume.id,
        analysis_id: receipt.analysis.id,
        ats_score: receipt.analysis.ats_score,
    }))
}

async fn read_file_part(mut multipart: Multipart) -> Result<StagedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("resume").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
        return Ok(StagedFile {
            file_name,
            mime_type,
            bytes,
        });
    }
    Err(AppError::Validation("Missing file field".to_string()))
}
