// Core types for the response pipeline

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Reply returned when the client asks for predefined mode and nothing matched
pub const DEFAULT_REPLY: &str = "No entendí. ¿Puedes reformular tu pregunta?";

/// Reply returned when something unexpected broke while answering
pub const INTERNAL_ERROR_REPLY: &str = "Error interno del servidor";

/// Generation services the router knows how to call
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Gemini,
    DeepSeek,
}

impl BackendKind {
    pub fn as_str(&self) -> &str {
        match self {
            BackendKind::Gemini => "Gemini",
            BackendKind::DeepSeek => "DeepSeek",
        }
    }

    /// Fixed text shown when the backend has no API key
    pub fn not_configured_reply(&self) -> String {
        format!("{} API Key no configurada.", self.as_str())
    }

    /// Fixed text shown when the backend call failed
    pub fn failure_reply(&self) -> String {
        format!("Error consultando {}", self.as_str())
    }
}

/// Per-request routing choice supplied by the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendSelector {
    #[default]
    Auto,
    Predefined,
    Backend(BackendKind),
}

impl BackendSelector {
    /// Parse a client hint. Unknown or empty hints fall back to `Auto`.
    pub fn from_hint(hint: &str) -> Self {
        match hint.trim().to_lowercase().as_str() {
            "predefined" | "predefinido" => BackendSelector::Predefined,
            "gemini" => BackendSelector::Backend(BackendKind::Gemini),
            "deepseek" => BackendSelector::Backend(BackendKind::DeepSeek),
            _ => BackendSelector::Auto,
        }
    }
}

/// A trigger phrase with its canned reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub trigger: String,
    pub reply: String,
}

impl Shortcut {
    pub fn new(trigger: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into().to_lowercase(),
            reply: reply.into(),
        }
    }
}

/// Trigger of the entry whose reply doubles as the predefined-mode fallback
pub const DEFAULT_TRIGGER: &str = "default";

/// Canned replies checked before any backend is invoked.
///
/// Entries are scanned in insertion order and the first trigger contained in
/// the message wins. The `default` entry is scanned like any other and also
/// supplies the fallback reply.
#[derive(Debug, Clone)]
pub struct ShortcutTable {
    entries: Vec<Shortcut>,
}

impl ShortcutTable {
    /// Build a table from `entries`. A `default` entry carrying `fallback` is
    /// appended when none is present.
    pub fn new(mut entries: Vec<Shortcut>, fallback: impl Into<String>) -> Self {
        if !entries.iter().any(|s| s.trigger == DEFAULT_TRIGGER) {
            entries.push(Shortcut::new(DEFAULT_TRIGGER, fallback));
        }
        Self { entries }
    }

    /// The stock table. The clock reply captures the time of construction.
    pub fn builtin() -> Self {
        let now = Local::now().format("%H:%M");
        Self::new(
            vec![
                Shortcut::new("hola", "¡Hola! ¿En qué puedo ayudarte?"),
                Shortcut::new(
                    "qué puedes hacer",
                    "Puedo responder preguntas con la ayuda de IA avanzada",
                ),
                Shortcut::new("qué hora es", format!("Son las {}", now)),
                Shortcut::new(
                    "cuéntame un chiste",
                    "¿Qué dice un semáforo a otro? ¡No me mires, me estoy cambiando! 😆",
                ),
                Shortcut::new("adiós", "¡Hasta luego! 💻"),
                Shortcut::new(DEFAULT_TRIGGER, DEFAULT_REPLY),
            ],
            DEFAULT_REPLY,
        )
    }

    /// First canned reply whose trigger occurs in the (already lowercased) message
    pub fn find(&self, message: &str) -> Option<&Shortcut> {
        self.entries
            .iter()
            .find(|shortcut| message.contains(shortcut.trigger.as_str()))
    }

    /// Reply of the `default` entry
    pub fn fallback(&self) -> &str {
        self.entries
            .iter()
            .find(|s| s.trigger == DEFAULT_TRIGGER)
            .map(|s| s.reply.as_str())
            .unwrap_or(DEFAULT_REPLY)
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[Shortcut] {
        &self.entries
    }
}

impl Default for ShortcutTable {
    fn default() -> Self {
        Self::builtin()
    }
}
