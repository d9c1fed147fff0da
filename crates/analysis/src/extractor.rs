use serde_json::Value;

use crate::schema::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Take the span from the first `{` to the last `}` anywhere in the reply.
    #[default]
    Lenient,
    /// The trimmed reply must itself be the brace span.
    Strict,
}

/// Pull a JSON value out of a model reply using the brace-span heuristic.
///
/// Prose or code fences around the object are tolerated. A stray `}` in
/// trailing prose, or two separate objects in one reply, widens the span and
/// usually ends in `JsonParseFailed`.
pub fn extract_json(raw: &str, mode: ExtractionMode) -> Result<Value, AnalysisError> {
    let no_json = || AnalysisError::NoJsonFound {
        raw: raw.to_string(),
    };

    let start = raw.find('{').ok_or_else(no_json)?;
    let end = raw.rfind('}').ok_or_else(no_json)?;
    if end <= start {
        return Err(no_json());
    }

    if mode == ExtractionMode::Strict {
        let trimmed = raw.trim();
        if !trimmed.starts_with('{') || !trimmed.ends_with('}') {
            return Err(no_json());
        }
    }

    // Both braces are ASCII, so the slice is on char boundaries.
    let candidate = &raw[start..=end];
    serde_json::from_str(candidate).map_err(|e| AnalysisError::JsonParseFailed {
        message: e.to_string(),
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ErrorKind;
    use serde_json::json;

    fn kind_of(raw: &str) -> ErrorKind {
        extract_json(raw, ExtractionMode::Lenient).unwrap_err().kind()
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(kind_of(""), ErrorKind::NoJsonFound);
        assert_eq!(kind_of("no braces here"), ErrorKind::NoJsonFound);
        assert_eq!(kind_of("{unterminated"), ErrorKind::NoJsonFound);
        assert_eq!(kind_of("} backwards {"), ErrorKind::NoJsonFound);
        assert_eq!(kind_of("{invalid json}"), ErrorKind::JsonParseFailed);
    }

    #[test]
    fn test_failures_keep_raw_reply() {
        let err = extract_json("{invalid json}", ExtractionMode::Lenient).unwrap_err();
        assert_eq!(err.raw(), Some("{invalid json}"));
        assert!(err.to_string().starts_with("Failed to parse JSON: "));

        let err = extract_json("no braces here", ExtractionMode::Lenient).unwrap_err();
        assert_eq!(err.raw(), Some("no braces here"));
    }

    #[test]
    fn test_exact_object() {
        let value = extract_json(r#"{"emotion": "sadness", "confidence": 0.87}"#, ExtractionMode::Lenient)
            .unwrap();
        assert_eq!(value, json!({"emotion": "sadness", "confidence": 0.87}));
    }

    #[test]
    fn test_prose_wrapped_object() {
        let object = json!({"emotion": "anger", "confidence": 0.42});
        let raw = format!("Sure! {} Hope that helps!", object);

        let value = extract_json(&raw, ExtractionMode::Lenient).unwrap();
        assert_eq!(value, object);
        // Same input, same answer
        assert_eq!(extract_json(&raw, ExtractionMode::Lenient).unwrap(), value);
    }

    #[test]
    fn test_fenced_reply() {
        let raw = "```json\n{\"emotion\": \"joy\", \"confidence\": 0.9}\n```";
        let value = extract_json(raw, ExtractionMode::Lenient).unwrap();
        assert_eq!(value, json!({"emotion": "joy", "confidence": 0.9}));
    }

    #[test]
    fn test_no_schema_enforcement() {
        let value = extract_json(r#"{"mood": 7, "confidence": "very"}"#, ExtractionMode::Lenient).unwrap();
        assert_eq!(value, json!({"mood": 7, "confidence": "very"}));
    }

    #[test]
    fn test_two_objects_widen_the_span() {
        let raw = r#"{"emotion": "joy"} or maybe {"emotion": "fear"}"#;
        assert_eq!(kind_of(raw), ErrorKind::JsonParseFailed);
    }

    #[test]
    fn test_strict_mode() {
        let raw = "```json\n{\"emotion\": \"joy\", \"confidence\": 0.9}\n```";
        let err = extract_json(raw, ExtractionMode::Strict).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoJsonFound);

        let raw = "  {\"emotion\": \"joy\", \"confidence\": 0.9}\n";
        let value = extract_json(raw, ExtractionMode::Strict).unwrap();
        assert_eq!(value["emotion"], "joy");
    }

    #[test]
    fn test_multibyte_prose() {
        let raw = "Voilà, {\"emotion\": \"calme\", \"confidence\": 0.6} ✓";
        let value = extract_json(raw, ExtractionMode::Lenient).unwrap();
        assert_eq!(value["emotion"], "calme");
    }
}
