use std::time::Duration;

use crate::error::ConfigError;

/// What to do when a non-terminal is declared on more than one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// The last declaration replaces the earlier alternatives.
    #[default]
    Overwrite,
    /// Later declarations add their alternatives after the earlier ones.
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Overrides the grammar's first declared non-terminal.
    pub start_symbol: Option<String>,
    /// Corrections accepted per `parse` call before giving up.
    pub max_corrections: usize,
    /// Accept even if tokens remain once the end marker is popped.
    pub allow_trailing_input: bool,
}

pub const DEFAULT_MAX_CORRECTIONS: usize = 8;

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            start_symbol: None,
            max_corrections: DEFAULT_MAX_CORRECTIONS,
            allow_trailing_input: false,
        }
    }
}

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const GEMINI_MODEL_ENV: &str = "GEMINI_MODEL";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Settings of the Gemini backed correction oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl OracleConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            temperature: 0.3,
            max_output_tokens: 5,
            timeout: Duration::from_secs(10),
        }
    }

    /// Read the API key (required) and model (optional) from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(GEMINI_API_KEY_ENV)
            .map_err(|_| ConfigError::MissingEnv(GEMINI_API_KEY_ENV))?;
        if api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: GEMINI_API_KEY_ENV,
                value: api_key,
            });
        }
        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var(GEMINI_MODEL_ENV) {
            config = config.with_model(model)?;
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: String) -> Result<Self, ConfigError> {
        if model.trim().is_empty() || model.contains('/') {
            return Err(ConfigError::InvalidValue {
                name: "model",
                value: model,
            });
        }
        self.model = model;
        Ok(self)
    }

    pub fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}
