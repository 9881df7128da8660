//! Text normalizer - cleans formatting residue and AI boilerplate out of generated text

use regex::Regex;
use std::sync::LazyLock;

/// Boilerplate phrases stripped from generated answers
pub const BOILERPLATE_PHRASES: &[&str] = &[
    "as an ai",
    "as a language model",
    "i am an ai",
    "please note that",
    "keep in mind that",
    "according to",
    "based on my knowledge",
    "i should note",
    "it's important to note",
    "here is",
    "here are",
    "for example",
    "in summary",
    "in conclusion",
    "additionally",
    "furthermore",
    "moreover",
];

static MARKDOWN_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*#_`~\-=]").expect("valid markdown pattern"));

static LINKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*?\]\(.*?\)").expect("valid link pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid blank line pattern"));

static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([.,!?;:])").expect("valid punctuation pattern"));

static SPACE_AFTER_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.,!?;:])\s+").expect("valid punctuation pattern"));

/// Deterministic cleanup of generated text. Holds the compiled phrase list.
pub struct TextNormalizer {
    phrases: Vec<Regex>,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self::with_phrases(BOILERPLATE_PHRASES)
    }

    /// Build a normalizer with a custom phrase list.
    ///
    /// Spaces inside a phrase match any whitespace run, so a phrase split by
    /// a double space or a line break is still caught.
    pub fn with_phrases(phrases: &[&str]) -> Self {
        let phrases = phrases
            .iter()
            .filter(|p| !p.trim().is_empty())
            .filter_map(|p| {
                let words: Vec<String> = p.split_whitespace().map(regex::escape).collect();
                Regex::new(&format!("(?i){}", words.join(r"\s+"))).ok()
            })
            .collect();

        Self { phrases }
    }

    /// Run the full cleanup pipeline. Never fails; empty input stays empty.
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        // 1. markdown punctuation becomes a plain space
        let mut out = MARKDOWN_CHARS.replace_all(text, " ").into_owned();

        // 2-3. links and boilerplate; a removal can expose another match
        loop {
            let before = out.len();
            out = LINKS.replace_all(&out, "").into_owned();
            for phrase in &self.phrases {
                out = phrase.replace_all(&out, "").into_owned();
            }
            if out.len() == before {
                break;
            }
        }

        // 4. whitespace
        out = WHITESPACE.replace_all(&out, " ").into_owned();
        out = BLANK_LINES.replace_all(&out, "\n").into_owned();

        // 5. trim
        let mut out = out.trim().to_string();

        // 6. capitalize
        if let Some(first) = out.chars().next() {
            if first.is_lowercase() {
                let rest = &out[first.len_utf8()..];
                out = first.to_uppercase().chain(rest.chars()).collect();
            }
        }

        // 7. punctuation spacing
        let out = SPACE_BEFORE_PUNCT.replace_all(&out, "$1");
        SPACE_AFTER_PUNCT.replace_all(&out, "$1 ").into_owned()
    }

    /// Absent input passes through untouched
    pub fn normalize_opt(&self, text: Option<&str>) -> Option<String> {
        text.map(|t| self.normalize(t))
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
