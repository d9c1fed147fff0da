const ANALYSIS_INSTRUCTIONS: &str = r#"Analyze the following reflection and reply with ONLY a single JSON object in this format: {"emotion": "<one word emotion>", "confidence": <confidence between 0 and 1>} and nothing else. Reflection: "#;

/// Build the emotion classification prompt for a reflection.
///
/// The reflection is appended verbatim. Nothing is escaped, so directives
/// inside the text reach the model unchanged.
pub fn build_analysis_prompt(reflection: &str) -> String {
    format!("{}{}", ANALYSIS_INSTRUCTIONS, reflection)
}
