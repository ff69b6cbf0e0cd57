//! Remote text-model backends.

mod gemini;
mod openai;

use std::future::Future;
use std::time::Duration;

use gridintel_core::{AppConfig, ModelProvider};

use crate::error::EnrichError;

pub use gemini::GeminiModel;
pub use openai::OpenAiChat;

/// A model that turns a prompt into free-form text.
pub trait TextModel {
    /// Sends `prompt` and returns the model's reply text.
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, EnrichError>> + Send;

    /// `false` when no remote call will ever be made.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// The configured backend.
#[derive(Debug)]
pub enum ModelBackend {
    OpenAi(OpenAiChat),
    Gemini(GeminiModel),
    Disabled,
}

impl ModelBackend {
    /// Builds the backend selected by `config.model_provider`.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Config`] if the provider needs an API key and
    /// none is configured, or [`EnrichError::Http`] if the HTTP client cannot
    /// be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, EnrichError> {
        let timeout = Duration::from_secs(config.enrich_timeout_secs);
        let api_key = || {
            config.model_api_key.clone().ok_or_else(|| {
                EnrichError::Config(format!("no API key configured for {}", config.model_provider))
            })
        };

        let backend = match config.model_provider {
            ModelProvider::OpenAi => {
                let mut model = OpenAiChat::new(api_key()?, &config.model, timeout)?;
                if let Some(base) = &config.model_base_url {
                    model = model.with_base_url(base);
                }
                ModelBackend::OpenAi(model)
            }
            ModelProvider::Gemini => {
                let mut model = GeminiModel::new(api_key()?, &config.model, timeout)?;
                if let Some(base) = &config.model_base_url {
                    model = model.with_base_url(base);
                }
                ModelBackend::Gemini(model)
            }
            ModelProvider::Disabled => ModelBackend::Disabled,
        };
        Ok(backend)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ModelBackend::OpenAi(_) => "openai",
            ModelBackend::Gemini(_) => "gemini",
            ModelBackend::Disabled => "disabled",
        }
    }
}

impl TextModel for ModelBackend {
    async fn complete(&self, prompt: &str) -> Result<String, EnrichError> {
        match self {
            ModelBackend::OpenAi(model) => model.complete(prompt).await,
            ModelBackend::Gemini(model) => model.complete(prompt).await,
            ModelBackend::Disabled => Err(EnrichError::Disabled),
        }
    }

    fn is_enabled(&self) -> bool {
        !matches!(self, ModelBackend::Disabled)
    }
}
