//! Pre-upload validation. Runs before any storage or network effect.

use thiserror::Error;

/// Maximum accepted document size: 10 MiB. Strictly larger is rejected.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Accepted document types: PDF, legacy Word, OOXML Word, plain text.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// Why a file was rejected. Display strings are user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileRejection {
    #[error("Please upload a PDF, DOC, DOCX, or TXT file.")]
    UnsupportedType { mime_type: String },

    #[error("Please upload a file smaller than 10MB.")]
    TooLarge { byte_size: u64 },
}

/// Pure predicate over the declared MIME type and byte size.
pub fn validate_file(mime_type: &str, byte_size: u64) -> Result<(), FileRejection> {
    if !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Err(FileRejection::UnsupportedType {
            mime_type: mime_type.to_string(),
        });
    }
    if byte_size > MAX_UPLOAD_BYTES {
        return Err(FileRejection::TooLarge { byte_size });
    }
    Ok(())
}
