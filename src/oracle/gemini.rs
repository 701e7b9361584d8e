use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{config::OracleConfig, error::OracleError};

use super::{first_token, CorrectionOracle};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| part.text.as_deref())
    }
}

/// Oracle backed by the Gemini `generateContent` endpoint.
///
/// One blocking request per suggestion, bounded by the configured timeout.
pub struct GeminiOracle {
    config: OracleConfig,
    agent: ureq::Agent,
}

impl GeminiOracle {
    pub fn new(config: OracleConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build()
            .into();
        Self { config, agent }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    fn request_body<'a>(&self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }

    /// Ask for a correction, keeping the failure cause.
    pub fn try_suggest(&self, error_description: &str) -> Result<String, OracleError> {
        let response = self
            .agent
            .post(&self.config.generate_url())
            .header("x-goog-api-key", &self.config.api_key)
            .header("content-type", "application/json")
            .send_json(self.request_body(error_description))?;

        let body: GenerateResponse = response
            .into_body()
            .read_json()
            .map_err(|e| OracleError::Malformed(e.to_string()))?;

        body.text()
            .and_then(first_token)
            .ok_or(OracleError::Empty)
    }
}

impl CorrectionOracle for GeminiOracle {
    fn suggest(&self, error_description: &str) -> Option<String> {
        debug!(model = %self.config.model, "requesting correction");
        match self.try_suggest(error_description) {
            Ok(suggestion) => {
                debug!(%suggestion, "oracle answered");
                Some(suggestion)
            }
            Err(e) => {
                warn!(error = %e, "correction oracle unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_body_shape() {
        let oracle = GeminiOracle::new(OracleConfig::new("key".to_string()));
        let body = serde_json::to_value(oracle.request_body("fix it")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "contents": [{ "parts": [{ "text": "fix it" }] }],
                "generationConfig": { "temperature": 0.3f32, "maxOutputTokens": 5 }
            })
        );
    }

    #[test]
    fn response_text_extraction() {
        let body: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": " +\n" }], "role": "model" } }]
        }))
        .unwrap();
        assert_eq!(body.text().and_then(first_token), Some("+".to_string()));

        let empty: GenerateResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(empty.text(), None);

        let blocked: GenerateResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [{}] })).unwrap();
        assert_eq!(blocked.text(), None);
    }

    #[test]
    fn unreachable_service_means_no_suggestion() {
        let mut config = OracleConfig::new("key".to_string());
        config.base_url = "http://127.0.0.1:9".to_string();
        config.timeout = Duration::from_millis(500);
        let oracle = GeminiOracle::new(config);
        assert!(oracle.try_suggest("Unexpected token").is_err());
        assert_eq!(oracle.suggest("Unexpected token"), None);
    }
}
