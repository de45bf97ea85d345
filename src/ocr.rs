//! Image text extraction.
//!
//! Recognition itself sits behind [`OcrBackend`]; the stock backend shells out
//! to the `tesseract` binary. [`ImageTextExtractor`] applies the confidence
//! filter, the noise cleanup and the preprocess/raw fallback on top of
//! whatever backend it is given. Extraction failures never propagate as
//! errors: they come back as an unsuccessful [`OcrExtraction`].

use crate::config::OcrSettings;
use crate::error::{Result, ScamAlertError, ValidationError};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

pub const SUPPORTED_FORMATS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tiff", "webp"];

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref OCR_NOISE: Regex = Regex::new(r"[|_~`]").unwrap();
}

/// Common misreads, applied in order.
const OCR_CONFUSIONS: [(&str, &str); 3] = [("0O", "OO"), ("l1", "ll"), ("rn", "m")];

/// Checks an upload before any bytes reach the backend.
pub fn validate_upload(
    filename: &str,
    size: usize,
    max_file_size: usize,
) -> std::result::Result<(), ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::NoFileSelected);
    }

    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_FORMATS.contains(&extension.as_str()) {
        return Err(ValidationError::UnsupportedFormat(filename.to_string()));
    }

    if size > max_file_size {
        return Err(ValidationError::FileTooLarge {
            size,
            limit: max_file_size,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrWord {
    pub text: String,
    pub confidence: f64,
}

pub trait OcrBackend: Send + Sync {
    /// Recognises words in `image`. With `preprocess` the backend should
    /// binarise the image before recognition.
    fn recognize(
        &self,
        image: &[u8],
        preprocess: bool,
    ) -> impl Future<Output = Result<Vec<OcrWord>>> + Send;

    fn is_available(&self) -> impl Future<Output = bool> + Send;
}

pub struct TesseractBackend {
    command: String,
    languages: String,
    timeout: Duration,
}

impl TesseractBackend {
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            command: settings.command.clone(),
            languages: settings.languages.clone(),
            timeout: Duration::from_secs(settings.timeout_seconds),
        }
    }
}

impl OcrBackend for TesseractBackend {
    async fn recognize(&self, image: &[u8], preprocess: bool) -> Result<Vec<OcrWord>> {
        let input = tempfile::NamedTempFile::new()?;
        tokio::fs::write(input.path(), image).await?;

        let mut command = Command::new(&self.command);
        command
            .arg(input.path())
            .arg("stdout")
            .args(["-l", self.languages.as_str(), "--oem", "3", "--psm", "6"]);
        if preprocess {
            // Sauvola adaptive thresholding
            command.args(["-c", "thresholding_method=2"]);
        }
        command
            .arg("tsv")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        log::debug!("Running {} (preprocess: {})", self.command, preprocess);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                ScamAlertError::Ocr(format!(
                    "{} timed out after {}s",
                    self.command,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| ScamAlertError::Ocr(format!("failed to run {}: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScamAlertError::Ocr(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(parse_tsv(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

/// Word rows of tesseract's TSV output. Rows without text or with a negative
/// confidence (page, block and line rows) are dropped.
pub fn parse_tsv(tsv: &str) -> Vec<OcrWord> {
    tsv.lines()
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split('\t').collect();
            if columns.len() < 12 {
                return None;
            }
            let confidence: f64 = columns[10].trim().parse().ok()?;
            let text = columns[11].trim();
            if confidence < 0.0 || text.is_empty() {
                return None;
            }
            Some(OcrWord {
                text: text.to_string(),
                confidence,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrExtraction {
    pub success: bool,
    pub text: String,
    pub raw_text: String,
    /// Mean word confidence in percent, rounded to two decimals.
    pub confidence: f64,
    pub word_count: usize,
    pub has_text: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OcrExtraction {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            text: String::new(),
            raw_text: String::new(),
            confidence: 0.0,
            word_count: 0,
            has_text: false,
            error: Some(error.into()),
        }
    }
}

pub struct ImageTextExtractor<B> {
    backend: B,
    min_word_confidence: f64,
    fallback_confidence: f64,
}

impl<B: OcrBackend> ImageTextExtractor<B> {
    pub fn new(backend: B, settings: &OcrSettings) -> Self {
        Self {
            backend,
            min_word_confidence: settings.min_word_confidence,
            fallback_confidence: settings.fallback_confidence,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn extract_text(&self, image: &[u8], preprocess: bool) -> OcrExtraction {
        match self.backend.recognize(image, preprocess).await {
            Ok(words) => self.assemble(&words),
            Err(e) => {
                log::warn!("OCR failed (preprocess: {}): {}", preprocess, e);
                OcrExtraction::failure(e.to_string())
            }
        }
    }

    /// Tries the preprocessed image first. When that finds nothing or is
    /// unsure, the raw image is tried too and the result with more words wins.
    pub async fn extract_with_fallback(&self, image: &[u8]) -> OcrExtraction {
        let result = self.extract_text(image, true).await;
        if result.has_text && result.confidence >= self.fallback_confidence {
            return result;
        }

        log::debug!(
            "Retrying OCR without preprocessing (has text: {}, confidence: {:.2})",
            result.has_text,
            result.confidence
        );
        let raw = self.extract_text(image, false).await;
        if raw.word_count > result.word_count {
            raw
        } else {
            result
        }
    }

    fn assemble(&self, words: &[OcrWord]) -> OcrExtraction {
        let kept: Vec<&OcrWord> = words
            .iter()
            .filter(|word| word.confidence > self.min_word_confidence)
            .filter(|word| !word.text.trim().is_empty())
            .collect();

        let raw_text = kept
            .iter()
            .map(|word| word.text.trim())
            .collect::<Vec<_>>()
            .join(" ");
        let confidence = if kept.is_empty() {
            0.0
        } else {
            let mean = kept.iter().map(|word| word.confidence).sum::<f64>() / kept.len() as f64;
            (mean * 100.0).round() / 100.0
        };

        let text = clean_extracted_text(&raw_text);
        let word_count = text.split_whitespace().count();

        OcrExtraction {
            success: true,
            has_text: !text.is_empty(),
            text,
            raw_text,
            confidence,
            word_count,
            error: None,
        }
    }
}

pub fn clean_extracted_text(text: &str) -> String {
    let text = WHITESPACE.replace_all(text, " ");
    let mut text = OCR_NOISE.replace_all(&text, "").into_owned();
    for (from, to) in OCR_CONFUSIONS {
        text = text.replace(from, to);
    }
    text.trim().to_string()
}
