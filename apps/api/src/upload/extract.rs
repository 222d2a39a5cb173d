//! Text extraction from uploaded documents.
//!
//! Extraction never fails the pipeline: unreadable input degrades to a fixed
//! sentinel or a synthetic description, because the orchestrator requires a
//! non-empty string and downstream stages tolerate low-information text.

#![allow(dead_code)]

use tracing::warn;

use crate::upload::stager::StagedFile;

/// Returned when plain-text bytes cannot be decoded (or decode to nothing).
pub const EXTRACTION_SENTINEL: &str = "Unable to extract text from this file format.";

/// Pluggable `file -> plainText` capability. Implementations must always
/// return some non-empty text; swapping in a real binary parser must not
/// change this contract.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, file: &StagedFile) -> String;
}

/// Baseline extractor: decodes plain text directly and substitutes a
/// synthetic description for every binary format.
pub struct PlaceholderExtractor;

impl TextExtractor for PlaceholderExtractor {
    fn extract(&self, file: &StagedFile) -> String {
        if file.mime_type == "text/plain" {
            decode_plain_text(&file.bytes)
        } else {
            synthetic_description(&file.file_name)
        }
    }
}

/// PDF-aware extractor. Word variants still degrade to the synthetic
/// description.
/// TODO: wire a DOC/DOCX parser behind this same trait once one is chosen.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, file: &StagedFile) -> String {
        match file.mime_type.as_str() {
            "text/plain" => decode_plain_text(&file.bytes),
            "application/pdf" => match pdf_extract::extract_text_from_mem(&file.bytes) {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => synthetic_description(&file.file_name),
                Err(e) => {
                    warn!("PDF extraction failed for {}: {e}", file.file_name);
                    synthetic_description(&file.file_name)
                }
            },
            _ => synthetic_description(&file.file_name),
        }
    }
}

fn decode_plain_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) if !text.is_empty() => text.to_string(),
        _ => EXTRACTION_SENTINEL.to_string(),
    }
}

fn synthetic_description(file_name: &str) -> String {
    format!("Resume file: {file_name}. Professional document uploaded for analysis.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn staged(file_name: &str, mime_type: &str, bytes: &[u8]) -> StagedFile {
        StagedFile {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes: Bytes::copy_from_slice(bytes),
        }
    }

    #[test]
    fn test_plain_text_is_decoded_verbatim() {
        let file = staged("cv.txt", "text/plain", b"Jane Doe\nRust Engineer");
        let text = PlaceholderExtractor.extract(&file);
        assert_eq!(text, "Jane Doe\nRust Engineer");
    }

    #[test]
    fn test_invalid_utf8_yields_sentinel() {
        let file = staged("cv.txt", "text/plain", &[0xff, 0xfe, 0x00]);
        let text = PlaceholderExtractor.extract(&file);
        assert_eq!(text, EXTRACTION_SENTINEL);
    }

    #[test]
    fn test_empty_plain_text_yields_sentinel() {
        let file = staged("cv.txt", "text/plain", b"");
        let text = PlaceholderExtractor.extract(&file);
        assert_eq!(text, EXTRACTION_SENTINEL);
    }

    #[test]
    fn test_binary_formats_get_synthetic_description() {
        let file = staged("resume.docx", "application/msword", b"\x00\x01");
        let text = PlaceholderExtractor.extract(&file);
        assert_eq!(
            text,
            "Resume file: resume.docx. Professional document uploaded for analysis."
        );
    }

    #[test]
    fn test_extraction_always_produces_nonempty_text() {
        let files = [
            staged("a.txt", "text/plain", b""),
            staged("b.pdf", "application/pdf", b"not a pdf"),
            staged("c.doc", "application/msword", b""),
        ];
        for file in &files {
            assert!(!PlaceholderExtractor.extract(file).is_empty());
            assert!(!PdfTextExtractor.extract(file).is_empty());
        }
    }

    #[test]
    fn test_pdf_extractor_degrades_on_garbage_pdf() {
        let file = staged("resume.pdf", "application/pdf", b"definitely not a pdf");
        let text = PdfTextExtractor.extract(&file);
        assert_eq!(
            text,
            "Resume file: resume.pdf. Professional document uploaded for analysis."
        );
    }
}
