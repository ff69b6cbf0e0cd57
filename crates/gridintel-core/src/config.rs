use crate::app_config::{AppConfig, ModelProvider};
use crate::ConfigError;

/// Browser-like `User-Agent` sent with every source request unless overridden.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load application configuration with enrichment switched off.
///
/// Behaves like [`load_app_config`] except that `GRIDINTEL_MODEL_PROVIDER` is
/// forced to `disabled`, so no model API key is required.
///
/// # Errors
///
/// Returns `ConfigError` if env vars are invalid.
pub fn load_app_config_without_enrichment() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_app_config(without_enrichment(|key| std::env::var(key)))
}

fn without_enrichment<F>(lookup: F) -> impl Fn(&str) -> Result<String, std::env::VarError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    move |key| {
        if key == "GRIDINTEL_MODEL_PROVIDER" {
            Ok("disabled".to_string())
        } else {
            lookup(key)
        }
    }
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let sources_path = PathBuf::from(or_default("GRIDINTEL_SOURCES_PATH", "./config/sources.json"));
    let output_dir = PathBuf::from(or_default("GRIDINTEL_OUTPUT_DIR", "./data"));
    let log_level = or_default("GRIDINTEL_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("GRIDINTEL_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("GRIDINTEL_USER_AGENT", DEFAULT_USER_AGENT);

    let max_attempts = parse_u32("GRIDINTEL_MAX_ATTEMPTS", "3")?;
    if max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "GRIDINTEL_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let request_delay_min_ms = parse_u64("GRIDINTEL_REQUEST_DELAY_MIN_MS", "2000")?;
    let request_delay_max_ms = parse_u64("GRIDINTEL_REQUEST_DELAY_MAX_MS", "5000")?;
    if request_delay_min_ms > request_delay_max_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "GRIDINTEL_REQUEST_DELAY_MIN_MS".to_string(),
            reason: format!(
                "{request_delay_min_ms} exceeds GRIDINTEL_REQUEST_DELAY_MAX_MS ({request_delay_max_ms})"
            ),
        });
    }
    let retry_backoff_base_ms = parse_u64("GRIDINTEL_RETRY_BACKOFF_BASE_MS", "1000")?;

    let model_provider = parse_model_provider(&or_default("GRIDINTEL_MODEL_PROVIDER", "openai"))?;
    let model = or_default("GRIDINTEL_MODEL", model_provider.default_model());
    let model_base_url = lookup("GRIDINTEL_MODEL_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let model_api_key = match model_provider.api_key_var() {
        Some(var) => Some(
            lookup(var)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))?,
        ),
        None => None,
    };

    let enrich_delay_ms = parse_u64("GRIDINTEL_ENRICH_DELAY_MS", "1000")?;
    let enrich_timeout_secs = parse_u64("GRIDINTEL_ENRICH_TIMEOUT_SECS", "60")?;

    Ok(AppConfig {
        sources_path,
        output_dir,
        log_level,
        request_timeout_secs,
        user_agent,
        max_attempts,
        request_delay_min_ms,
        request_delay_max_ms,
        retry_backoff_base_ms,
        model_provider,
        model,
        model_base_url,
        model_api_key,
        enrich_delay_ms,
        enrich_timeout_secs,
    })
}

/// Parse the `GRIDINTEL_MODEL_PROVIDER` value. Unknown providers are rejected.
fn parse_model_provider(s: &str) -> Result<ModelProvider, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "openai" => Ok(ModelProvider::OpenAi),
        "gemini" | "google" => Ok(ModelProvider::Gemini),
        "disabled" | "none" | "off" => Ok(ModelProvider::Disabled),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GRIDINTEL_MODEL_PROVIDER".to_string(),
            reason: format!("unknown provider '{other}'; expected openai, gemini, or disabled"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
