// Translator - detects foreign-language answers and converts them to the display language

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::TranslatorConfig;

/// Common English function words used to spot untranslated answers
pub const FOREIGN_MARKERS: &[&str] = &[
    "the", "is", "are", "and", "of", "in", "to", "for", "with", "that", "this", "you", "your",
    "it", "its", "he", "she", "they", "them", "their", "our", "we", "what", "when", "where",
    "why", "how", "which", "who", "whom", "whose", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "can", "may", "might", "must", "shall", "about", "above",
    "after", "before", "between", "into", "through", "during", "including", "until", "upon",
    "within",
];

/// Foreign-word fraction above which text gets translated
pub const DEFAULT_THRESHOLD: f64 = 0.1;

static WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z]+\b").expect("valid word pattern"));

/// External service able to translate text into a target language
#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslatorError>;
}

/// Client for the public Google Translate `translate_a/single` endpoint
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslatorConfig) -> Result<Self, TranslatorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TranslatorError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl TranslationService for GoogleTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslatorError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| TranslatorError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TranslatorError::StatusError(response.status().as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TranslatorError::ParseError(e.to_string()))?;

        extract_translation(&body)
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The payload is a nested array whose first element lists
/// `[translated, original, ...]` segments.
fn extract_translation(body: &Value) -> Result<String, TranslatorError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslatorError::ParseError("missing segment list".to_string()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        return Err(TranslatorError::EmptyTranslation);
    }

    Ok(text)
}

/// Best-effort language cleanup applied to backend answers
pub struct LanguageNormalizer {
    service: Option<Arc<dyn TranslationService>>,
    target_language: String,
    threshold: f64,
}

impl LanguageNormalizer {
    pub fn new(service: Arc<dyn TranslationService>, target_language: impl Into<String>) -> Self {
        Self {
            service: Some(service),
            target_language: target_language.into(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// A normalizer that never translates
    pub fn disabled() -> Self {
        Self {
            service: None,
            target_language: String::new(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Build from configuration, wiring the Google client when enabled
    pub fn from_config(config: &TranslatorConfig) -> Result<Self, TranslatorError> {
        if !config.enabled {
            return Ok(Self::disabled());
        }
        let service = Arc::new(GoogleTranslator::new(config)?);
        Ok(Self::new(service, config.target_language.clone()).with_threshold(config.threshold))
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Translate `text` when it looks foreign; otherwise, or on any failure, return it as-is
    pub async fn normalize_language(&self, text: &str) -> String {
        let Some(service) = &self.service else {
            return text.to_string();
        };

        let Some(ratio) = foreign_ratio(text) else {
            return text.to_string();
        };

        debug!("Language detection: {:.2}% foreign words", ratio * 100.0);

        if ratio <= self.threshold {
            return text.to_string();
        }

        info!("Translating answer to '{}'", self.target_language);
        match service.translate(text, &self.target_language).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Translation failed, keeping original text: {}", e);
                text.to_string()
            }
        }
    }
}

/// Fraction of word tokens found in [`FOREIGN_MARKERS`], `None` when there are no tokens
pub fn foreign_ratio(text: &str) -> Option<f64> {
    let lowered = text.to_lowercase();
    let mut total = 0usize;
    let mut foreign = 0usize;

    for word in WORDS.find_iter(&lowered) {
        total += 1;
        if FOREIGN_MARKERS.contains(&word.as_str()) {
            foreign += 1;
        }
    }

    if total == 0 {
        None
    } else {
        Some(foreign as f64 / total as f64)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranslatorError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Translation service returned status {0}")]
    StatusError(u16),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Translation service returned no text")]
    EmptyTranslation,
}
