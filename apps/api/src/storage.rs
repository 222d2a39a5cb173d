//! Object storage operations for uploaded resume documents.

use std::path::Path;

use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Builds the storage key for an uploaded document:
/// `{user_id}/{unix_millis}.{ext}`.
///
/// The user-id prefix is the access-control boundary enforced upstream; the
/// millisecond timestamp keeps keys unique and non-enumerable across users.
pub fn object_key(user_id: Uuid, file_name: &str, now: DateTime<Utc>) -> String {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or("bin");
    format!("{}/{}.{}", user_id, now.timestamp_millis(), extension)
}

/// Uploads one resume blob. A failure here surfaces as a storage error and
/// aborts the pipeline; an already-written blob with no metadata record is
/// tolerated (keys are generated and never reused).
pub async fn put_resume_blob(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    content_type: &str,
    bytes: Vec<u8>,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(bytes))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("blob upload failed: {e}")))?;

    info!("Uploaded resume blob to s3://{}/{}", bucket, key);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_object_key_uses_user_prefix_and_extension() {
        let user_id = Uuid::nil();
        let key = object_key(user_id, "resume.pdf", fixed_now());
        assert!(key.starts_with(&format!("{user_id}/")));
        assert!(key.ends_with(".pdf"));
    }

    #[test]
    fn test_object_key_embeds_unix_millis() {
        let now = fixed_now();
        let key = object_key(Uuid::nil(), "cv.txt", now);
        assert!(key.contains(&now.timestamp_millis().to_string()));
    }

    #[test]
    fn test_object_key_defaults_extension_for_bare_names() {
        let key = object_key(Uuid::nil(), "resume", fixed_now());
        assert!(key.ends_with(".bin"));
    }

    #[test]
    fn test_object_key_keeps_last_extension_only() {
        let key = object_key(Uuid::nil(), "resume.final.docx", fixed_now());
        assert!(key.ends_with(".docx"));
        assert!(!key.contains("final"));
    }
}
