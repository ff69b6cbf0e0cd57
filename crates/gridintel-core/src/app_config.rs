use std::path::PathBuf;

/// Remote text-understanding backend used for enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    OpenAi,
    Gemini,
    /// Enrichment is skipped; every record receives the default analysis.
    Disabled,
}

impl ModelProvider {
    /// Model identifier used when `GRIDINTEL_MODEL` is not set.
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            ModelProvider::OpenAi => "gpt-3.5-turbo",
            ModelProvider::Gemini => "gemini-1.5-flash",
            ModelProvider::Disabled => "",
        }
    }

    /// Environment variable holding the API key for this provider.
    #[must_use]
    pub fn api_key_var(self) -> Option<&'static str> {
        match self {
            ModelProvider::OpenAi => Some("OPENAI_API_KEY"),
            ModelProvider::Gemini => Some("GOOGLE_AI_API_KEY"),
            ModelProvider::Disabled => None,
        }
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelProvider::OpenAi => write!(f, "openai"),
            ModelProvider::Gemini => write!(f, "gemini"),
            ModelProvider::Disabled => write!(f, "disabled"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub sources_path: PathBuf,
    pub output_dir: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_attempts: u32,
    pub request_delay_min_ms: u64,
    pub request_delay_max_ms: u64,
    pub retry_backoff_base_ms: u64,
    pub model_provider: ModelProvider,
    pub model: String,
    pub model_base_url: Option<String>,
    pub model_api_key: Option<String>,
    pub enrich_delay_ms: u64,
    pub enrich_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("sources_path", &self.sources_path)
            .field("output_dir", &self.output_dir)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_attempts", &self.max_attempts)
            .field("request_delay_min_ms", &self.request_delay_min_ms)
            .field("request_delay_max_ms", &self.request_delay_max_ms)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("model_provider", &self.model_provider)
            .field("model", &self.model)
            .field("model_base_url", &self.model_base_url)
            .field(
                "model_api_key",
                &self.model_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("enrich_delay_ms", &self.enrich_delay_ms)
            .field("enrich_timeout_secs", &self.enrich_timeout_secs)
            .finish()
    }
}
