use analysis::{Analyzer, CompletionProvider, ExtractionMode, GeminiClient};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub extraction: ExtractionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Never serialized or logged.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub strict: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0:8000".to_string(),
            },
            provider: ProviderConfig {
                api_key: None,
                model: GeminiClient::DEFAULT_MODEL.to_string(),
                base_url: GeminiClient::DEFAULT_BASE_URL.to_string(),
                timeout_secs: None,
            },
            extraction: ExtractionConfig { strict: false },
            logging: LoggingConfig {
                format: LogFormat::Pretty,
            },
        }
    }
}

impl AppConfig {
    /// Process environment first, then a `.env` file if one is found.
    pub fn load() -> Result<Self> {
        let file_vars = match dotenvy::dotenv_iter() {
            Ok(iter) => read_dotenv(iter)?,
            Err(e) if e.not_found() => HashMap::new(),
            Err(e) => return Err(e).context("Failed to open .env"),
        };
        Self::from_lookup(layered(|key| std::env::var(key).ok(), &file_vars))
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        config.provider.api_key = get("GEMINI_API_KEY");
        if let Some(model) = get("GEMINI_MODEL") {
            config.provider.model = model;
        }
        if let Some(base_url) = get("GEMINI_BASE_URL") {
            config.provider.base_url = base_url;
        }
        if let Some(secs) = get("PROVIDER_TIMEOUT_SECS") {
            let secs = secs
                .parse::<u64>()
                .with_context(|| format!("Invalid PROVIDER_TIMEOUT_SECS: {}", secs))?;
            config.provider.timeout_secs = Some(secs);
        }
        if let Some(addr) = get("BIND_ADDR") {
            config.server.bind_addr = addr;
        }
        if let Some(strict) = get("ANALYZE_STRICT_JSON") {
            config.extraction.strict = parse_flag(&strict)
                .with_context(|| format!("Invalid ANALYZE_STRICT_JSON: {}", strict))?;
        }
        if let Some(format) = get("LOG_FORMAT") {
            config.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" | "text" => LogFormat::Pretty,
                other => anyhow::bail!("Invalid LOG_FORMAT: {}", other),
            };
        }

        Ok(config)
    }

    pub fn extraction_mode(&self) -> ExtractionMode {
        if self.extraction.strict {
            ExtractionMode::Strict
        } else {
            ExtractionMode::Lenient
        }
    }

    /// Build the analyzer once at startup. A missing key is not an error:
    /// the analyzer comes back unconfigured.
    pub fn build_analyzer(&self) -> Result<Analyzer> {
        let Some(api_key) = self.provider.api_key.clone() else {
            tracing::warn!("GEMINI_API_KEY not set, /analyze will report the provider as unavailable");
            return Ok(Analyzer::new(None, self.extraction_mode()));
        };

        let client = GeminiClient::new(
            self.provider.base_url.clone(),
            self.provider.model.clone(),
            api_key,
            self.provider.timeout_secs.map(Duration::from_secs),
        )?;
        tracing::info!(model = client.model(), "Gemini provider configured");

        let provider: Arc<dyn CompletionProvider> = Arc::new(client);
        Ok(Analyzer::new(Some(provider), self.extraction_mode()))
    }
}

fn read_dotenv<R: Read>(iter: dotenvy::Iter<R>) -> Result<HashMap<String, String>> {
    iter.collect::<Result<HashMap<_, _>, _>>().context("Invalid .env file")
}

fn layered<'a, F>(env: F, file_vars: &'a HashMap<String, String>) -> impl Fn(&str) -> Option<String> + 'a
where
    F: Fn(&str) -> Option<String> + 'a,
{
    move |key: &str| env(key).or_else(|| file_vars.get(key).cloned())
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("expected a boolean"),
    }
}
