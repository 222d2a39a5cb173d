// Prompt constants for the analysis pipeline. The enumerated fields and key
// names here are the contract the response parser validates against; change
// both together or not at all.

/// System prompt for resume analysis. Enumerates exactly the five required
/// output fields and pins the JSON key names and types.
pub const ANALYSIS_SYSTEM: &str = r#"You are an expert resume analyzer and career consultant. Analyze the provided resume and extract:
1. Skills - categorize into technical skills, soft skills, certifications
2. Experience Summary - brief overview of career trajectory
3. Strengths - 3-5 key strong points
4. Areas for Improvement - 3-5 specific actionable suggestions
5. ATS Score - rate from 0-100 based on:
   - Keywords and industry terms
   - Formatting and structure
   - Quantifiable achievements
   - Action verbs usage
   - Overall optimization for Applicant Tracking Systems

Return ONLY a valid JSON object with this exact structure:
{
  "skills": {
    "technical": ["skill1", "skill2"],
    "soft": ["skill1", "skill2"],
    "certifications": ["cert1", "cert2"]
  },
  "experienceSummary": "string",
  "strengths": ["strength1", "strength2", "strength3"],
  "improvements": ["improvement1", "improvement2", "improvement3"],
  "atsScore": number
}"#;

/// User message template. Replace `{resume_text}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = "Analyze this resume:\n\n{resume_text}";

/// Builds the user message: the fixed instruction plus the resume verbatim.
pub fn build_analysis_prompt(resume_text: &str) -> String {
    ANALYSIS_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_deterministic_and_verbatim() {
        let prompt = build_analysis_prompt("Jane Doe\nRust Engineer");
        assert_eq!(prompt, "Analyze this resume:\n\nJane Doe\nRust Engineer");
        assert_eq!(prompt, build_analysis_prompt("Jane Doe\nRust Engineer"));
    }

    #[test]
    fn test_system_prompt_names_every_required_key() {
        for key in [
            "technical",
            "soft",
            "certifications",
            "experienceSummary",
            "strengths",
            "improvements",
            "atsScore",
        ] {
            assert!(ANALYSIS_SYSTEM.contains(key), "missing key: {key}");
        }
    }
}
