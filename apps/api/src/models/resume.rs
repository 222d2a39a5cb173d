use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One uploaded resume document. Immutable after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    /// Object storage key: `{user_id}/{unix_millis}.{ext}`.
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    pub created_at: DateTime<Utc>,
}

/// One completed analysis run. Insert-only; re-analysis adds a new row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub user_id: Uuid,
    /// JSON object with `technical` / `soft` / `certifications` string arrays.
    pub skills: Value,
    pub experience_summary: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// Always within [0, 100]; enforced before insert and by a CHECK constraint.
    pub ats_score: i32,
    pub created_at: DateTime<Utc>,
}
