//! Canonical feature text for the statistical classifiers.
//!
//! URLs, long numbers, amounts and PINs are masked with fixed placeholder
//! tokens before punctuation is stripped. The URL and PIN placeholders are
//! guaranteed to be present in the output whenever the raw text carried them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

pub const URL_TOKEN: &str = "urllink";
pub const NUMBER_TOKEN: &str = "nomor";
pub const AMOUNT_TOKEN: &str = "nominal";
pub const PIN_TOKEN: &str = "pincode";

/// Built-in delegates, as recorded in a saved model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegateKind {
    Noop,
    #[default]
    Stopword,
}

impl DelegateKind {
    pub fn delegate(self) -> Arc<dyn TextDelegate> {
        match self {
            DelegateKind::Noop => Arc::new(NoopDelegate),
            DelegateKind::Stopword => Arc::new(StopwordDelegate::default()),
        }
    }
}

/// Language-specific stopword removal and stemming.
pub trait TextDelegate: Send + Sync {
    fn remove_stopwords(&self, text: &str) -> String;
    fn stem(&self, text: &str) -> String;

    /// `None` for delegates a saved model cannot rebuild.
    fn kind(&self) -> Option<DelegateKind> {
        None
    }
}

/// Leaves text untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDelegate;

impl TextDelegate for NoopDelegate {
    fn remove_stopwords(&self, text: &str) -> String {
        text.to_string()
    }

    fn stem(&self, text: &str) -> String {
        text.to_string()
    }

    fn kind(&self) -> Option<DelegateKind> {
        Some(DelegateKind::Noop)
    }
}

const INDONESIAN_STOPWORDS: &[&str] = &[
    "yang", "dan", "di", "ke", "dari", "ini", "itu", "untuk", "dengan", "pada", "adalah",
    "akan", "juga", "atau", "ada", "sudah", "telah", "oleh", "karena", "bahwa", "dalam",
    "agar", "supaya", "saja", "lagi", "pun", "kah", "lah", "nya", "para", "sebagai",
    "seperti", "tersebut", "masih", "bisa", "dapat", "hanya", "sangat", "sebuah", "setelah",
];

/// Drops common Indonesian function words; stemming is the identity.
#[derive(Debug, Clone)]
pub struct StopwordDelegate {
    stopwords: HashSet<&'static str>,
}

impl Default for StopwordDelegate {
    fn default() -> Self {
        Self {
            stopwords: INDONESIAN_STOPWORDS.iter().copied().collect(),
        }
    }
}

impl TextDelegate for StopwordDelegate {
    fn remove_stopwords(&self, text: &str) -> String {
        text.split_whitespace()
            .filter(|word| !self.stopwords.contains(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn stem(&self, text: &str) -> String {
        text.to_string()
    }

    fn kind(&self) -> Option<DelegateKind> {
        Some(DelegateKind::Stopword)
    }
}

pub struct TextNormalizer {
    url_marker: Regex,
    pin_marker: Regex,
    url_regex: Regex,
    long_number_regex: Regex,
    rupiah_regex: Regex,
    dollar_regex: Regex,
    pin_regex: Regex,
    non_alnum_regex: Regex,
    whitespace_regex: Regex,
    delegate: Arc<dyn TextDelegate>,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self::with_delegate(Arc::new(NoopDelegate))
    }

    pub fn with_delegate(delegate: Arc<dyn TextDelegate>) -> Self {
        let pin = r"pin[:;]?\s*\d+|no\s*pin|\d+\s*pin\b";
        Self {
            url_marker: Regex::new(r"https?://|www\.").unwrap(),
            pin_marker: Regex::new(pin).unwrap(),
            url_regex: Regex::new(r"http\S+|www\.\S+").unwrap(),
            long_number_regex: Regex::new(r"\b\d{8,}\b").unwrap(),
            rupiah_regex: Regex::new(
                r"\brp\s*\.?\d+(?:[.,]\d+)*(?:\s*(?:ribu|rb|juta|jt|[kmt])\b)?",
            )
            .unwrap(),
            dollar_regex: Regex::new(r"\$\s*\d+(?:[.,]\d+)*[kmb]?\b").unwrap(),
            pin_regex: Regex::new(pin).unwrap(),
            non_alnum_regex: Regex::new(r"[^a-z0-9\s]").unwrap(),
            whitespace_regex: Regex::new(r"\s+").unwrap(),
            delegate,
        }
    }

    pub fn delegate_kind(&self) -> Option<DelegateKind> {
        self.delegate.kind()
    }

    pub fn normalize(&self, raw: &str) -> String {
        let text = raw.to_lowercase();

        let has_url = self.url_marker.is_match(&text);
        let has_pin = self.pin_marker.is_match(&text);

        let text = self.url_regex.replace_all(&text, URL_TOKEN);
        let text = self.long_number_regex.replace_all(&text, NUMBER_TOKEN);
        let text = self.rupiah_regex.replace_all(&text, AMOUNT_TOKEN);
        let text = self.dollar_regex.replace_all(&text, AMOUNT_TOKEN);
        let text = self.pin_regex.replace_all(&text, PIN_TOKEN);
        let text = self.non_alnum_regex.replace_all(&text, " ");
        let text = self.whitespace_regex.replace_all(&text, " ");
        let text = text.trim();

        let text = self.delegate.remove_stopwords(text);
        let mut text = self.delegate.stem(&text);

        if has_url {
            append_missing(&mut text, URL_TOKEN);
        }
        if has_pin {
            append_missing(&mut text, PIN_TOKEN);
        }

        text
    }
}

fn append_missing(text: &mut String, token: &str) {
    if text.split_whitespace().any(|word| word == token) {
        return;
    }
    if !text.is_empty() {
        text.push(' ');
    }
    text.push_str(token);
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
