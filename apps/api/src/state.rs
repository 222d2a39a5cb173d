use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::auth::AuthClient;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::upload::extract::TextExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub llm: LlmClient,
    pub auth: AuthClient,
    pub config: Config,
    /// Pluggable text extractor. Default: PdfTextExtractor; Word variants
    /// still degrade to a synthetic description until a real parser lands.
    pub extractor: Arc<dyn TextExtractor>,
}
