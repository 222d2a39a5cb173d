//! Upload staging: one file's journey from selection to stored analysis.
//!
//! The machine advances through a fixed phase order and reports monotone
//! progress at each entry. Collaborators sit behind traits so the sequencing
//! and failure behavior are testable without live services.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{AnalysisRow, ResumeRow};
use crate::storage::object_key;
use crate::upload::extract::TextExtractor;
use crate::upload::validate::validate_file;

/// A document as received from the client, before any validation.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

/// Phases in strict order. `Failed` is tracked separately on the session so
/// the failing phase is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Validating,
    UploadingBlob,
    PersistingMetadata,
    Extracting,
    Invoking,
    Complete,
}

impl UploadPhase {
    /// Progress checkpoint reported on entry to this phase.
    pub fn progress(self) -> u8 {
        match self {
            UploadPhase::Idle => 0,
            UploadPhase::Validating => 10,
            UploadPhase::UploadingBlob => 20,
            UploadPhase::PersistingMetadata => 40,
            UploadPhase::Extracting => 60,
            UploadPhase::Invoking => 80,
            UploadPhase::Complete => 100,
        }
    }

    fn rank(self) -> u8 {
        match self {
            UploadPhase::Idle => 0,
            UploadPhase::Validating => 1,
            UploadPhase::UploadingBlob => 2,
            UploadPhase::PersistingMetadata => 3,
            UploadPhase::Extracting => 4,
            UploadPhase::Invoking => 5,
            UploadPhase::Complete => 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StagerError {
    #[error("an upload is already in progress")]
    Busy,

    #[error("session is terminal")]
    Terminal,

    #[error("invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition { from: UploadPhase, to: UploadPhase },
}

impl From<StagerError> for AppError {
    fn from(error: StagerError) -> Self {
        match error {
            StagerError::Busy => {
                AppError::Validation("An upload is already in progress.".to_string())
            }
            other => AppError::Internal(anyhow::anyhow!(other)),
        }
    }
}

/// Terminal failure record: the phase that failed and a displayable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    pub phase: UploadPhase,
    pub reason: String,
}

/// Transient per-upload state. Created on file selection, discarded once the
/// terminal outcome has been displayed. Never persisted.
#[derive(Debug)]
pub struct UploadSession {
    phase: UploadPhase,
    progress: u8,
    failure: Option<UploadFailure>,
    analysis_id: Option<Uuid>,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadSession {
    pub fn new() -> Self {
        Self {
            phase: UploadPhase::Idle,
            progress: 0,
            failure: None,
            analysis_id: None,
        }
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    /// Displayed progress. Reset to 0 once failed; that reset is
    /// presentational, the monotonic guarantee covers live sessions only.
    pub fn progress(&self) -> u8 {
        if self.failure.is_some() {
            0
        } else {
            self.progress
        }
    }

    pub fn failure(&self) -> Option<&UploadFailure> {
        self.failure.as_ref()
    }

    /// The handoff value for result display; set on `Complete` only.
    pub fn analysis_id(&self) -> Option<Uuid> {
        self.analysis_id
    }

    pub fn is_uploading(&self) -> bool {
        self.failure.is_none()
            && !matches!(self.phase, UploadPhase::Idle | UploadPhase::Complete)
    }

    pub fn is_terminal(&self) -> bool {
        self.failure.is_some() || self.phase == UploadPhase::Complete
    }

    /// Enters the next phase. Only the immediate successor is legal, and a
    /// terminal session cannot transition at all.
    fn advance(&mut self, to: UploadPhase) -> Result<(), StagerError> {
        if self.is_terminal() {
            return Err(StagerError::Terminal);
        }
        if to.rank() != self.phase.rank() + 1 {
            return Err(StagerError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        self.progress = self.progress.max(to.progress());
        Ok(())
    }

    fn complete(&mut self, analysis_id: Uuid) -> Result<(), StagerError> {
        self.advance(UploadPhase::Complete)?;
        self.analysis_id = Some(analysis_id);
        Ok(())
    }

    fn fail(&mut self, reason: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        self.failure = Some(UploadFailure {
            phase: self.phase,
            reason: reason.into(),
        });
    }
}

/// Stores one uploaded blob at a caller-chosen key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, content_type: &str, bytes: &[u8]) -> Result<(), AppError>;
}

/// New resume metadata, inserted after the blob write succeeds.
#[derive(Debug, Clone)]
pub struct NewResume {
    pub user_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn insert(&self, new: NewResume) -> Result<ResumeRow, AppError>;
}

/// The server-side orchestration call, seen from the stager's side.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        user_id: Uuid,
        resume_id: Uuid,
        resume_text: &str,
    ) -> Result<AnalysisRow, AppError>;
}

/// Both stored records, returned to the caller on completion.
#[derive(Debug)]
pub struct UploadReceipt {
    pub resume: ResumeRow,
    pub analysis: AnalysisRow,
}

/// Drives validator -> blob store -> metadata store -> extractor ->
/// orchestrator for one session. Steps run strictly in order; each depends
/// on data the previous one produced.
pub struct UploadStager<'a> {
    pub blobs: &'a dyn BlobStore,
    pub resumes: &'a dyn ResumeStore,
    pub extractor: &'a dyn TextExtractor,
    pub analyzer: &'a dyn Analyzer,
}

impl UploadStager<'_> {
    pub async fn run(
        &self,
        session: &mut UploadSession,
        user_id: Uuid,
        file: StagedFile,
    ) -> Result<UploadReceipt, AppError> {
        if session.is_uploading() || session.is_terminal() {
            return Err(StagerError::Busy.into());
        }

        session.advance(UploadPhase::Validating)?;
        if let Err(rejection) = validate_file(&file.mime_type, file.bytes.len() as u64) {
            return Err(self.abort(session, AppError::Validation(rejection.to_string())));
        }

        session.advance(UploadPhase::UploadingBlob)?;
        let key = object_key(user_id, &file.file_name, Utc::now());
        if let Err(error) = self.blobs.put(&key, &file.mime_type, &file.bytes).await {
            return Err(self.abort(session, error));
        }

        session.advance(UploadPhase::PersistingMetadata)?;
        let resume = match self
            .resumes
            .insert(NewResume {
                user_id,
                file_name: file.file_name.clone(),
                file_path: key,
                file_size: file.bytes.len() as i64,
                file_type: file.mime_type.clone(),
            })
            .await
        {
            Ok(row) => row,
            Err(error) => return Err(self.abort(session, error)),
        };

        session.advance(UploadPhase::Extracting)?;
        // Extraction cannot fail; unreadable input degrades to placeholder text.
        let resume_text = self.extractor.extract(&file);

        session.advance(UploadPhase::Invoking)?;
        let analysis = match self.analyzer.analyze(user_id, resume.id, &resume_text).await {
            Ok(row) => row,
            Err(error) => return Err(self.abort(session, error)),
        };

        session.complete(analysis.id)?;
        info!(
            "Upload complete: resume {} analysis {} for user {}",
            resume.id, analysis.id, user_id
        );

        Ok(UploadReceipt { resume, analysis })
    }

    fn abort(&self, session: &mut UploadSession, error: AppError) -> AppError {
        session.fail(error.to_string());
        error
    }
}
