//! Strict parsing of the generation service's free-form output.
//!
//! The model is untrusted: every field is checked explicitly, nothing is
//! invented for absent text fields, and the score is clamped rather than
//! rejected so a usable result is not discarded over a cosmetic deviation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("missing or mistyped field: {0}")]
    SchemaViolation(&'static str),
}

/// Three named skill sets. Entries are trimmed, deduplicated, and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillProfile {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
    pub certifications: Vec<String>,
}

/// A schema-conformant analysis, ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAnalysis {
    pub skills: SkillProfile,
    pub experience_summary: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// Integer in [0, 100], clamped from whatever number the model emitted.
    pub ats_score: i32,
}

/// Parses and validates one raw model response.
///
/// Field checks run in a fixed order and the first offender is named in the
/// error. Missing skill arrays are tolerated as empty; missing summary,
/// strengths, improvements, or score are fatal.
pub fn parse_analysis(raw: &str) -> Result<ParsedAnalysis, ParseError> {
    let text = strip_code_fences(raw);
    let value: Value = serde_json::from_str(text)?;
    let object = value.as_object().ok_or(ParseError::NotAnObject)?;

    let skills_map = match object.get("skills") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => return Err(ParseError::SchemaViolation("skills")),
    };
    let skills = SkillProfile {
        technical: skill_set(skills_map, "technical", "skills.technical")?,
        soft: skill_set(skills_map, "soft", "skills.soft")?,
        certifications: skill_set(skills_map, "certifications", "skills.certifications")?,
    };

    let experience_summary = object
        .get("experienceSummary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::SchemaViolation("experienceSummary"))?
        .to_string();

    let strengths = required_strings(object, "strengths")?;
    let improvements = required_strings(object, "improvements")?;

    let raw_score = object
        .get("atsScore")
        .and_then(Value::as_f64)
        .ok_or(ParseError::SchemaViolation("atsScore"))?;

    Ok(ParsedAnalysis {
        skills,
        experience_summary,
        strengths,
        improvements,
        ats_score: clamp_score(raw_score),
    })
}

/// Rounds to the nearest integer and clamps into [0, 100].
pub fn clamp_score(raw: f64) -> i32 {
    raw.round().clamp(0.0, 100.0) as i32
}

/// A skill array may be absent (empty set) but not mistyped. Entries are
/// trimmed; blanks and duplicates are dropped, order otherwise preserved.
fn skill_set(
    skills: Option<&serde_json::Map<String, Value>>,
    key: &str,
    label: &'static str,
) -> Result<Vec<String>, ParseError> {
    let value = match skills.and_then(|map| map.get(key)) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(value) => value,
    };
    let items = value.as_array().ok_or(ParseError::SchemaViolation(label))?;

    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let entry = item
            .as_str()
            .ok_or(ParseError::SchemaViolation(label))?
            .trim();
        if entry.is_empty() || out.iter().any(|seen| seen == entry) {
            continue;
        }
        out.push(entry.to_string());
    }
    Ok(out)
}

/// Strengths and improvements must be present, arrays of strings, and
/// non-empty after blank entries are dropped. Absence here makes the result
/// meaningless to the end user, so it is fatal.
fn required_strings(
    object: &serde_json::Map<String, Value>,
    label: &'static str,
) -> Result<Vec<String>, ParseError> {
    let items = object
        .get(label)
        .and_then(Value::as_array)
        .ok_or(ParseError::SchemaViolation(label))?;

    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let entry = item
            .as_str()
            .ok_or(ParseError::SchemaViolation(label))?
            .trim();
        if !entry.is_empty() {
            out.push(entry.to_string());
        }
    }
    if out.is_empty() {
        return Err(ParseError::SchemaViolation(label));
    }
    Ok(out)
}

/// Strips ```json ... ``` or ``` ... ``` code fences the model sometimes
/// wraps its JSON in.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{
        "skills": {
            "technical": ["Rust", "PostgreSQL"],
            "soft": ["Communication"],
            "certifications": ["AWS SAA"]
        },
        "experienceSummary": "Seven years of backend work.",
        "strengths": ["Strong systems background", "Quantified results"],
        "improvements": ["Add a summary section", "List certifications first"],
        "atsScore": 82
    }"#;

    #[test]
    fn test_well_formed_response_parses() {
        let parsed = parse_analysis(WELL_FORMED).unwrap();
        assert_eq!(parsed.skills.technical, ["Rust", "PostgreSQL"]);
        assert_eq!(parsed.experience_summary, "Seven years of backend work.");
        assert_eq!(parsed.strengths.len(), 2);
        assert_eq!(parsed.improvements.len(), 2);
        assert_eq!(parsed.ats_score, 82);
    }

    #[test]
    fn test_fenced_output_parses_identically() {
        let fenced = format!("```json\n{WELL_FORMED}\n```");
        let bare_fence = format!("```\n{WELL_FORMED}\n```");
        assert_eq!(parse_analysis(&fenced).unwrap(), parse_analysis(WELL_FORMED).unwrap());
        assert_eq!(
            parse_analysis(&bare_fence).unwrap(),
            parse_analysis(WELL_FORMED).unwrap()
        );
    }

    #[test]
    fn test_float_score_rounds_to_integer() {
        let raw = WELL_FORMED.replace("82", "82.6");
        assert_eq!(parse_analysis(&raw).unwrap().ats_score, 83);
    }

    #[test]
    fn test_overshooting_score_clamps_to_100() {
        let raw = WELL_FORMED.replace("82", "107.4");
        assert_eq!(parse_analysis(&raw).unwrap().ats_score, 100);
    }

    #[test]
    fn test_negative_score_clamps_to_0() {
        let raw = WELL_FORMED.replace("82", "-3");
        assert_eq!(parse_analysis(&raw).unwrap().ats_score, 0);
    }

    #[test]
    fn test_non_numeric_score_is_schema_violation() {
        let raw = WELL_FORMED.replace("82", "\"85\"");
        let error = parse_analysis(&raw).unwrap_err();
        assert!(matches!(error, ParseError::SchemaViolation("atsScore")));
    }

    #[test]
    fn test_missing_improvements_is_fatal() {
        let raw = r#"{
            "skills": {"technical": [], "soft": [], "certifications": []},
            "experienceSummary": "summary",
            "strengths": ["one"],
            "atsScore": 50
        }"#;
        let error = parse_analysis(raw).unwrap_err();
        assert!(matches!(error, ParseError::SchemaViolation("improvements")));
    }

    #[test]
    fn test_empty_strengths_array_is_fatal() {
        let raw = WELL_FORMED.replace(
            r#"["Strong systems background", "Quantified results"]"#,
            "[]",
        );
        let error = parse_analysis(&raw).unwrap_err();
        assert!(matches!(error, ParseError::SchemaViolation("strengths")));
    }

    #[test]
    fn test_empty_but_present_technical_array_is_fine() {
        let raw = WELL_FORMED.replace(r#"["Rust", "PostgreSQL"]"#, "[]");
        let parsed = parse_analysis(&raw).unwrap();
        assert!(parsed.skills.technical.is_empty());
    }

    #[test]
    fn test_missing_skills_object_yields_empty_sets() {
        let raw = r#"{
            "experienceSummary": "summary",
            "strengths": ["one"],
            "improvements": ["two"],
            "atsScore": 50
        }"#;
        let parsed = parse_analysis(raw).unwrap();
        assert!(parsed.skills.technical.is_empty());
        assert!(parsed.skills.soft.is_empty());
        assert!(parsed.skills.certifications.is_empty());
    }

    #[test]
    fn test_mistyped_skill_array_names_the_field() {
        let raw = WELL_FORMED.replace(r#"["Communication"]"#, r#""Communication""#);
        let error = parse_analysis(&raw).unwrap_err();
        assert!(matches!(error, ParseError::SchemaViolation("skills.soft")));
    }

    #[test]
    fn test_skill_entries_are_deduplicated_and_trimmed() {
        let raw = WELL_FORMED.replace(
            r#"["Rust", "PostgreSQL"]"#,
            r#"["Rust", "  Rust  ", "", "PostgreSQL"]"#,
        );
        let parsed = parse_analysis(&raw).unwrap();
        assert_eq!(parsed.skills.technical, ["Rust", "PostgreSQL"]);
    }

    #[test]
    fn test_blank_summary_is_fatal() {
        let raw = WELL_FORMED.replace("Seven years of backend work.", "   ");
        let error = parse_analysis(&raw).unwrap_err();
        assert!(matches!(
            error,
            ParseError::SchemaViolation("experienceSummary")
        ));
    }

    #[test]
    fn test_prose_response_is_malformed() {
        let error = parse_analysis("Here is my analysis of the resume...").unwrap_err();
        assert!(matches!(error, ParseError::Malformed(_)));
    }

    #[test]
    fn test_json_array_response_is_not_an_object() {
        let error = parse_analysis("[1, 2, 3]").unwrap_err();
        assert!(matches!(error, ParseError::NotAnObject));
    }
}
