pub mod app_config;
pub mod config;
pub mod records;
pub mod sources;

pub use app_config::{AppConfig, ModelProvider};
pub use config::{load_app_config, load_app_config_from_env, load_app_config_without_enrichment};
pub use records::{RawRecord, UtilityIndicators};
pub use sources::{
    load_sources, AnalysisCategories, Priority, SelectorMap, SourceConfig, SourceRegistry,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in sources file {path}: {source}")]
    SourcesFileParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML in sources file {path}: {source}")]
    SourcesFileYaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("sources validation error: {0}")]
    Validation(String),
}
