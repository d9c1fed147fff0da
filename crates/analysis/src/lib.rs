pub mod schema;
pub mod prompt;
pub mod extractor;
pub mod provider;

pub use schema::{AnalysisRequest, AnalysisResult, AnalysisError, ErrorKind};
pub use extractor::{extract_json, ExtractionMode};
pub use provider::{CompletionProvider, GeminiClient};

use serde_json::Value;
use std::sync::Arc;

/// Classifies the emotion of a reflection through an LLM provider.
///
/// Built once at startup. Without a provider every call fails with
/// `ProviderUnavailable` and nothing goes out on the network.
#[derive(Clone)]
pub struct Analyzer {
    provider: Option<Arc<dyn CompletionProvider>>,
    mode: ExtractionMode,
}

impl Analyzer {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>, mode: ExtractionMode) -> Self {
        Self { provider, mode }
    }

    pub fn unconfigured() -> Self {
        Self::new(None, ExtractionMode::default())
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Run one analysis. Single attempt, no retries.
    pub async fn analyze(&self, text: &str) -> Result<Value, AnalysisError> {
        let provider = self.provider.as_ref().ok_or(AnalysisError::ProviderUnavailable)?;

        let prompt = prompt::build_analysis_prompt(text);

        let raw = provider.generate(&prompt).await.map_err(|e| {
            tracing::warn!(error = %e, "Provider call failed");
            AnalysisError::ProviderCallFailed {
                message: format!("{:#}", e),
            }
        })?;
        tracing::debug!(raw = %raw, "Provider response");

        extract_json(&raw, self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays a fixed reply and remembers the prompts it was given.
    struct ScriptedProvider {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(reply: Result<&str, &str>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(anyhow::anyhow!(message.clone())),
            }
        }
    }

    fn analyzer(provider: Arc<ScriptedProvider>) -> Analyzer {
        Analyzer::new(Some(provider as Arc<dyn CompletionProvider>), ExtractionMode::Lenient)
    }

    #[tokio::test]
    async fn test_unconfigured() {
        let analyzer = Analyzer::unconfigured();
        assert!(!analyzer.is_configured());

        let err = analyzer.analyze("I failed my exam today").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
        assert_eq!(err.to_string(), "Gemini API key not configured.");
    }

    #[tokio::test]
    async fn test_success_passes_object_through() {
        let provider = ScriptedProvider::new(Ok(r#"{"emotion": "sadness", "confidence": 0.87}"#));
        let analyzer = analyzer(provider.clone());

        let value = analyzer.analyze("I failed my exam today").await.unwrap();
        assert_eq!(value, json!({"emotion": "sadness", "confidence": 0.87}));

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with("Reflection: I failed my exam today"));
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let provider = ScriptedProvider::new(Err("quota exceeded"));
        let analyzer = analyzer(provider.clone());

        let err = analyzer.analyze("hello").await.unwrap_err();
        assert_eq!(err, AnalysisError::ProviderCallFailed { message: "quota exceeded".to_string() });
        assert_eq!(provider.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_not_retried() {
        let provider = ScriptedProvider::new(Ok("I'm not sure how you feel."));
        let analyzer = analyzer(provider.clone());

        let err = analyzer.analyze("hello").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoJsonFound);
        assert_eq!(err.raw(), Some("I'm not sure how you feel."));
        assert_eq!(provider.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_fences() {
        let provider = ScriptedProvider::new(Ok("```json\n{\"emotion\": \"joy\", \"confidence\": 0.9}\n```"));
        let lenient = analyzer(provider.clone());
        let strict = Analyzer::new(Some(provider as Arc<dyn CompletionProvider>), ExtractionMode::Strict);

        assert_eq!(lenient.analyze("x").await.unwrap()["emotion"], "joy");
        assert_eq!(strict.analyze("x").await.unwrap_err().kind(), ErrorKind::NoJsonFound);
    }
}
