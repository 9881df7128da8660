// Router - answers a chat message from the shortcut table or a generation backend

use super::backends::{BackendError, Backends};
use super::normalizer::TextNormalizer;
use super::translator::{LanguageNormalizer, TranslatorError};
use super::types::{BackendKind, BackendSelector, INTERNAL_ERROR_REPLY, ShortcutTable};
use crate::config::CharlaConfig;
use std::sync::Arc;
use tracing::{error, info};

/// Entry point of the response pipeline.
///
/// Shortcut lookup, backend dispatch, translation and text cleanup run in
/// that order. All shared state is read-only, so one router can serve
/// concurrent requests.
pub struct Router {
    shortcuts: Arc<ShortcutTable>,
    backends: Backends,
    language: Arc<LanguageNormalizer>,
    text: Arc<TextNormalizer>,
    default_backend: BackendKind,
}

impl Router {
    pub fn new(
        shortcuts: ShortcutTable,
        backends: Backends,
        language: LanguageNormalizer,
        default_backend: BackendKind,
    ) -> Self {
        Self {
            shortcuts: Arc::new(shortcuts),
            backends,
            language: Arc::new(language),
            text: Arc::new(TextNormalizer::new()),
            default_backend,
        }
    }

    /// Wire the real adapters and translator from configuration
    pub fn from_config(config: &CharlaConfig) -> Result<Self, RouterError> {
        let backends = Backends::from_config(config)?;
        let language = LanguageNormalizer::from_config(&config.translator)?;

        Ok(Self::new(
            ShortcutTable::builtin(),
            backends,
            language,
            config.router.default_backend,
        ))
    }

    /// Answer `message`. Every failure is turned into reply text.
    pub async fn route(&self, message: &str, selector: BackendSelector) -> String {
        match self.try_route(message, selector).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Internal error while answering: {}", e);
                INTERNAL_ERROR_REPLY.to_string()
            }
        }
    }

    /// Convenience for callers holding the raw client hint
    pub async fn route_hint(&self, message: &str, hint: &str) -> String {
        self.route(message, BackendSelector::from_hint(hint)).await
    }

    async fn try_route(&self, message: &str, selector: BackendSelector) -> Result<String, RouterError> {
        let message = message.to_lowercase();
        info!("Message received: '{}' ({:?})", message, selector);

        if let Some(shortcut) = self.shortcuts.find(&message) {
            info!("Using canned reply for '{}'", shortcut.trigger);
            return Ok(shortcut.reply.clone());
        }

        let kind = match selector {
            BackendSelector::Predefined => {
                info!("Predefined mode, no shortcut matched");
                return Ok(self.shortcuts.fallback().to_string());
            }
            BackendSelector::Backend(kind) => kind,
            BackendSelector::Auto => self.default_backend,
        };

        info!("Routing to {}", kind.as_str());
        self.generate(kind, message).await
    }

    /// Backend call plus post-processing, isolated in its own task so a
    /// panicking stage surfaces as an error instead of unwinding into the caller
    async fn generate(&self, kind: BackendKind, message: String) -> Result<String, RouterError> {
        let backend = self.backends.get(kind);
        let language = self.language.clone();
        let text = self.text.clone();

        let handle = tokio::spawn(async move {
            let raw = match backend.generate(&message).await {
                Ok(raw) => raw,
                Err(e) => return e.reply(kind),
            };
            let translated = language.normalize_language(&raw).await;
            text.normalize(&translated)
        });

        handle
            .await
            .map_err(|e| RouterError::Internal(format!("response task failed: {}", e)))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("Backend setup error: {0}")]
    BackendSetup(#[from] BackendError),

    #[error("Translator setup error: {0}")]
    TranslatorSetup(#[from] TranslatorError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::backends::Backend;
    use crate::pipeline::translator::TranslationService;
    use crate::pipeline::types::DEFAULT_REPLY;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Reply(&'static str),
        Fail(fn() -> BackendError),
        Panic,
    }

    struct FakeBackend {
        kind: BackendKind,
        behavior: Behavior,
        calls: AtomicUsize,
        last_message: std::sync::Mutex<Option<String>>,
    }

    impl FakeBackend {
        fn new(kind: BackendKind, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                kind,
                behavior,
                calls: AtomicUsize::new(0),
                last_message: std::sync::Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn generate(&self, message: &str) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_message.lock().unwrap() = Some(message.to_string());
            match &self.behavior {
                Behavior::Reply(text) => Ok(text.to_string()),
                Behavior::Fail(make) => Err(make()),
                Behavior::Panic => panic!("adapter blew up"),
            }
        }

        fn kind(&self) -> BackendKind {
            self.kind
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    struct FakeTranslator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TranslationService for FakeTranslator {
        async fn translate(&self, _text: &str, _target: &str) -> Result<String, TranslatorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("la respuesta traducida .".to_string())
        }
    }

    struct Harness {
        router: Router,
        gemini: Arc<FakeBackend>,
        deepseek: Arc<FakeBackend>,
        translator: Arc<FakeTranslator>,
    }

    fn harness(gemini: Behavior, deepseek: Behavior) -> Harness {
        let gemini = FakeBackend::new(BackendKind::Gemini, gemini);
        let deepseek = FakeBackend::new(BackendKind::DeepSeek, deepseek);
        let translator = Arc::new(FakeTranslator {
            calls: AtomicUsize::new(0),
        });

        let router = Router::new(
            ShortcutTable::builtin(),
            Backends::new(gemini.clone(), deepseek.clone()),
            LanguageNormalizer::new(translator.clone(), "es"),
            BackendKind::Gemini,
        );

        Harness {
            router,
            gemini,
            deepseek,
            translator,
        }
    }

    #[tokio::test]
    async fn test_shortcut_wins_for_every_hint() {
        let h = harness(Behavior::Reply("nunca"), Behavior::Reply("nunca"));

        for hint in ["auto", "predefinido", "gemini", "deepseek", "???"] {
            let reply = h.router.route_hint("HOLA amigo", hint).await;
            assert_eq!(reply, "¡Hola! ¿En qué puedo ayudarte?");
        }

        assert_eq!(h.gemini.calls(), 0);
        assert_eq!(h.deepseek.calls(), 0);
        assert_eq!(h.translator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_default_trigger_short_circuits_every_hint() {
        let h = harness(Behavior::Reply("nunca"), Behavior::Reply("nunca"));

        for hint in ["auto", "predefined", "gemini", "deepseek"] {
            let reply = h.router.route_hint("What is the DEFAULT setting?", hint).await;
            assert_eq!(reply, DEFAULT_REPLY);
        }

        assert_eq!(h.gemini.calls(), 0);
        assert_eq!(h.deepseek.calls(), 0);
    }

    #[tokio::test]
    async fn test_predefined_returns_default_verbatim() {
        let h = harness(Behavior::Reply("x"), Behavior::Reply("x"));

        let reply = h
            .router
            .route("explain recursion", BackendSelector::Predefined)
            .await;

        assert_eq!(reply, DEFAULT_REPLY);
        assert_eq!(h.gemini.calls(), 0);
    }

    #[tokio::test]
    async fn test_auto_uses_default_backend_and_cleans_output() {
        let h = harness(
            Behavior::Reply("**La recursión** es  una función que se llama a sí misma ."),
            Behavior::Reply("x"),
        );

        let reply = h.router.route("Explain Recursion", BackendSelector::Auto).await;

        assert_eq!(reply, "La recursión es una función que se llama a sí misma.");
        assert_eq!(h.gemini.calls(), 1);
        assert_eq!(h.deepseek.calls(), 0);
        assert_eq!(
            h.gemini.last_message.lock().unwrap().as_deref(),
            Some("explain recursion")
        );
    }

    #[tokio::test]
    async fn test_named_backend_is_used() {
        let h = harness(Behavior::Reply("x"), Behavior::Reply("desde deepseek"));

        let reply = h.router.route_hint("explain recursion", "deepseek").await;

        assert_eq!(reply, "Desde deepseek");
        assert_eq!(h.deepseek.calls(), 1);
        assert_eq!(h.gemini.calls(), 0);
    }

    #[tokio::test]
    async fn test_foreign_answer_is_translated_then_normalized() {
        let h = harness(
            Behavior::Reply("the answer is that you should use a loop"),
            Behavior::Reply("x"),
        );

        let reply = h.router.route_hint("explain recursion", "gemini").await;

        assert_eq!(reply, "La respuesta traducida.");
        assert_eq!(h.translator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backend_failures_become_fixed_text() {
        let h = harness(
            Behavior::Fail(|| BackendError::NotConfigured),
            Behavior::Fail(|| BackendError::NetworkError("timeout".to_string())),
        );

        assert_eq!(
            h.router.route_hint("explain recursion", "auto").await,
            "Gemini API Key no configurada."
        );
        assert_eq!(
            h.router.route_hint("explain recursion", "deepseek").await,
            "Error consultando DeepSeek"
        );
        assert_eq!(h.translator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panicking_backend_yields_internal_error() {
        let h = harness(Behavior::Panic, Behavior::Reply("x"));

        let reply = h.router.route_hint("explain recursion", "gemini").await;

        assert_eq!(reply, INTERNAL_ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_router_from_config_without_keys() {
        let mut config = CharlaConfig::default();
        config.translator.enabled = false;
        config.router.default_backend = BackendKind::DeepSeek;
        let router = Router::from_config(&config).unwrap();

        assert_eq!(
            router.route_hint("explain recursion", "auto").await,
            "DeepSeek API Key no configurada."
        );
        assert_eq!(
            router.route_hint("adiós", "gemini").await,
            "¡Hasta luego! 💻"
        );
    }
}
