// Gemini backend - Google Generative Language REST API

use super::{Backend, BackendError};
use crate::config::GeminiConfig;
use crate::pipeline::types::BackendKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Marker some Gemini prompts echo back into the answer
const SOURCE_MARKER: &str = "[IA: gemini]";

pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl GeminiBackend {
    pub fn new(config: &GeminiConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.credential().map(str::to_string),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    async fn request(&self, api_key: &str, message: &str) -> Result<String, BackendError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: message.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.endpoint, self.model))
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BackendError::StatusError(response.status().as_u16()));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .ok_or_else(|| BackendError::ParseError("response has no candidates".to_string()))?;

        let text = text.replace(SOURCE_MARKER, "").trim().to_string();
        if text.is_empty() {
            return Err(BackendError::ParseError("response has no text".to_string()));
        }

        Ok(text)
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    async fn generate(&self, message: &str) -> Result<String, BackendError> {
        let Some(api_key) = &self.api_key else {
            return Err(BackendError::NotConfigured);
        };

        self.request(api_key, message).await.inspect_err(|e| {
            warn!("Gemini request failed: {}", e);
        })
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Gemini
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
