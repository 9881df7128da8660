// DeepSeek backend - reached through OpenRouter's OpenAI-compatible chat API

use super::{Backend, BackendError};
use crate::config::DeepSeekConfig;
use crate::pipeline::types::BackendKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

pub struct DeepSeekBackend {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl DeepSeekBackend {
    pub fn new(config: &DeepSeekConfig) -> Result<Self, BackendError> {
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
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: message.to_string(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BackendError::StatusError(response.status().as_u16()));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| BackendError::ParseError("response has no choices".to_string()))
    }
}

#[async_trait]
impl Backend for DeepSeekBackend {
    async fn generate(&self, message: &str) -> Result<String, BackendError> {
        let Some(api_key) = &self.api_key else {
            return Err(BackendError::NotConfigured);
        };

        self.request(api_key, message).await.inspect_err(|e| {
            warn!("DeepSeek request failed: {}", e);
        })
    }

    fn kind(&self) -> BackendKind {
        BackendKind::DeepSeek
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config_for(server: &mockito::Server, api_key: Option<&str>) -> DeepSeekConfig {
        DeepSeekConfig {
            api_key: api_key.map(str::to_string),
            endpoint: format!("{}/api/v1/", server.url()),
            ..DeepSeekConfig::default()
        }
    }

    #[tokio::test]
    async fn test_not_configured_makes_no_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let backend = DeepSeekBackend::new(&config_for(&server, Some(""))).unwrap();
        let result = backend.generate("hola").await;

        assert!(matches!(result, Err(BackendError::NotConfigured)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_sends_bearer_and_extracts_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/chat/completions")
            .match_header("authorization", "Bearer sk-or-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "deepseek-chat",
                "messages": [{"role": "user", "content": "explain recursion"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Recursion is..."}}]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let backend = DeepSeekBackend::new(&config_for(&server, Some("sk-or-test"))).unwrap();
        let text = backend.generate("explain recursion").await.unwrap();

        assert_eq!(text, "Recursion is...");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_single_attempt_on_server_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/chat/completions")
            .with_status(502)
            .expect(1)
            .create_async()
            .await;

        let backend = DeepSeekBackend::new(&config_for(&server, Some("k"))).unwrap();
        let result = backend.generate("hola").await;

        assert!(matches!(result, Err(BackendError::StatusError(502))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let backend = DeepSeekBackend::new(&config_for(&server, Some("k"))).unwrap();
        let result = backend.generate("hola").await;

        assert!(matches!(result, Err(BackendError::ParseError(_))));
    }
}
