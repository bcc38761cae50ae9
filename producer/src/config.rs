use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Producer configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Schema namespace used in qualified type names
    #[validate(length(min = 1, message = "Namespace cannot be empty"))]
    pub namespace: String,

    /// Server-enforced maximum page size
    #[validate(range(
        min = 1,
        max = 10000,
        message = "Max results must be between 1 and 10000"
    ))]
    pub max_results: usize,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            namespace: "relgraph".to_string(),
            max_results: 50,
        }
    }
}

impl ProducerConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            namespace: env::var("RELGRAPH_NAMESPACE").unwrap_or_else(|_| "relgraph".to_string()),
            max_results: parse_env_var("RELGRAPH_MAX_RESULTS", "50")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from a JSON document
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            field: "json_content".to_string(),
            value: content.to_string(),
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
