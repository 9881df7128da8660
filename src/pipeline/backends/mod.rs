// Backend adapters - one per external text-generation service

mod deepseek;
mod gemini;

pub use deepseek::DeepSeekBackend;
pub use gemini::GeminiBackend;

use super::types::BackendKind;
use crate::config::CharlaConfig;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Uniform contract every generation service is wrapped behind
#[async_trait]
pub trait Backend: Send + Sync {
    /// Send `message` to the service and return its raw answer.
    ///
    /// Makes at most one network request and never retries.
    async fn generate(&self, message: &str) -> Result<String, BackendError>;

    /// Which service this adapter talks to
    fn kind(&self) -> BackendKind;

    /// Whether a credential is loaded
    fn is_configured(&self) -> bool;
}

/// One adapter bound to each [`BackendKind`]
#[derive(Clone)]
pub struct Backends {
    gemini: Arc<dyn Backend>,
    deepseek: Arc<dyn Backend>,
}

impl Backends {
    pub fn new(gemini: Arc<dyn Backend>, deepseek: Arc<dyn Backend>) -> Self {
        Self { gemini, deepseek }
    }

    /// Build the real HTTP adapters from configuration
    pub fn from_config(config: &CharlaConfig) -> Result<Self, BackendError> {
        let backends = Self::new(
            Arc::new(GeminiBackend::new(&config.gemini)?),
            Arc::new(DeepSeekBackend::new(&config.deepseek)?),
        );

        for backend in [&backends.gemini, &backends.deepseek] {
            info!(
                "{} API key loaded: {}",
                backend.kind().as_str(),
                backend.is_configured()
            );
        }

        Ok(backends)
    }

    pub fn get(&self, kind: BackendKind) -> Arc<dyn Backend> {
        match kind {
            BackendKind::Gemini => self.gemini.clone(),
            BackendKind::DeepSeek => self.deepseek.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("API key not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Service returned status {0}")]
    StatusError(u16),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl BackendError {
    /// Text the user sees for this failure
    pub fn reply(&self, kind: BackendKind) -> String {
        match self {
            BackendError::NotConfigured => kind.not_configured_reply(),
            _ => kind.failure_reply(),
        }
    }
}
