//! Request and response shapes for the predict, batch, OCR and health
//! endpoints, and the handlers that validate requests before they reach the
//! detector. Transport is left to the embedding application.

use crate::components::WarningLevel;
use crate::config::DEFAULT_MODEL_NAME;
use crate::detector::ScamDetector;
use crate::error::{Result, ScamAlertError, ValidationError};
use crate::machine_learning::Label;
use crate::ocr::{validate_upload, ImageTextExtractor, OcrBackend, OcrExtraction};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

const SCAM_RECOMMENDATION: &str = "Kemungkinan besar ini adalah pesan penipuan. Jangan berikan informasi pribadi atau transfer uang.";
const SAFE_RECOMMENDATION: &str =
    "Pesan ini tampak aman. Namun tetap berhati-hati dengan informasi sensitif.";

fn default_model_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "default_model_name")]
    pub model_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Banded on classifier confidence; high bands only escalate for scams.
    pub fn assess(confidence: f64, is_scam: bool) -> Self {
        if confidence > 80.0 {
            if is_scam {
                RiskLevel::Critical
            } else {
                RiskLevel::Low
            }
        } else if confidence > 60.0 {
            if is_scam {
                RiskLevel::High
            } else {
                RiskLevel::Low
            }
        } else if confidence > 40.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    pub final_label: Label,
    pub is_scam: bool,
    pub scam_probability: f64,
    pub classifier_confidence: f64,
    pub warning_level: WarningLevel,
    pub risk_factors: Vec<String>,
    pub adjusted: bool,
    pub adjustment_reason: String,
    pub risk_level: RiskLevel,
    pub recommendation: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub messages: Option<Vec<String>>,
    #[serde(default = "default_model_name")]
    pub model_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub message: String,
    pub final_label: Label,
    pub is_scam: bool,
    pub classifier_confidence: f64,
    pub scam_probability: f64,
    pub warning_level: WarningLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success: bool,
    pub total: usize,
    pub results: Vec<BatchItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrRequest {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub image_base64: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
    pub ocr_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip)]
    pub status: u16,
}

impl From<&ScamAlertError> for ErrorResponse {
    fn from(error: &ScamAlertError) -> Self {
        let status = match error {
            ScamAlertError::Validation(_) => 400,
            _ => 500,
        };
        Self {
            success: false,
            error: error.to_string(),
            status,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn handle_predict(detector: &ScamDetector, request: PredictRequest) -> Result<PredictResponse> {
    let message = request
        .message
        .ok_or(ValidationError::MissingField("message"))?;
    if message.trim().is_empty() {
        return Err(ValidationError::EmptyMessage.into());
    }

    let verdict = detector.predict(&message, Some(&request.model_name))?;
    let recommendation = if verdict.is_scam {
        SCAM_RECOMMENDATION
    } else {
        SAFE_RECOMMENDATION
    };

    Ok(PredictResponse {
        success: true,
        final_label: verdict.final_label,
        is_scam: verdict.is_scam,
        scam_probability: round2(verdict.scam_probability),
        classifier_confidence: round2(verdict.classifier_confidence),
        warning_level: verdict.warning_level,
        risk_level: RiskLevel::assess(verdict.classifier_confidence, verdict.is_scam),
        risk_factors: verdict.risk_factors,
        adjusted: verdict.adjusted,
        adjustment_reason: verdict.adjustment_reason,
        recommendation: recommendation.to_string(),
        model: request.model_name,
    })
}

pub fn handle_batch(detector: &ScamDetector, request: BatchRequest) -> Result<BatchResponse> {
    let messages = request
        .messages
        .ok_or(ValidationError::MissingField("messages"))?;

    let kept: Vec<&String> = messages.iter().filter(|m| !m.trim().is_empty()).collect();
    let verdicts = detector.batch_predict(&kept[..], Some(&request.model_name))?;

    let results: Vec<BatchItem> = kept
        .into_iter()
        .zip(verdicts)
        .map(|(message, verdict)| BatchItem {
            message: message.clone(),
            final_label: verdict.final_label,
            is_scam: verdict.is_scam,
            classifier_confidence: round2(verdict.classifier_confidence),
            scam_probability: round2(verdict.scam_probability),
            warning_level: verdict.warning_level,
        })
        .collect();

    Ok(BatchResponse {
        success: true,
        total: results.len(),
        results,
    })
}

/// Byte length of a padded base64 payload, known without decoding it.
fn decoded_len(encoded: &str) -> usize {
    let padding = encoded.bytes().rev().take_while(|&b| b == b'=').count().min(2);
    (encoded.len() / 4 * 3).saturating_sub(padding)
}

/// Decodes and validates the upload, then runs OCR with fallback. Only
/// request problems are errors; OCR failures come back in the extraction.
pub async fn handle_ocr<B: OcrBackend>(
    extractor: &ImageTextExtractor<B>,
    max_file_size: usize,
    request: OcrRequest,
) -> Result<OcrExtraction> {
    let encoded = request
        .image_base64
        .ok_or(ValidationError::MissingField("image"))?;
    let encoded = encoded.trim();
    validate_upload(&request.filename, decoded_len(encoded), max_file_size)?;
    let image = STANDARD
        .decode(encoded)
        .map_err(|_| ValidationError::InvalidEncoding)?;

    Ok(extractor.extract_with_fallback(&image).await)
}

pub async fn health<B: OcrBackend>(
    detector: Option<&ScamDetector>,
    extractor: &ImageTextExtractor<B>,
) -> HealthStatus {
    HealthStatus {
        status: "ok".to_string(),
        model_loaded: detector.map(|d| d.is_ready()).unwrap_or(false),
        ocr_available: extractor.backend().is_available().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::DecisionConfig;
    use crate::config::OcrSettings;
    use crate::lexicon::Lexicon;
    use crate::machine_learning::testing::FixedClassifier;
    use crate::ocr::OcrWord;
    use std::sync::Arc;

    struct StaticOcr(Vec<OcrWord>);

    impl OcrBackend for StaticOcr {
        async fn recognize(&self, _image: &[u8], _preprocess: bool) -> Result<Vec<OcrWord>> {
            Ok(self.0.clone())
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    fn detector() -> ScamDetector {
        let lexicon = Lexicon::default().compile().unwrap();
        let mut detector = ScamDetector::new(Arc::new(lexicon), DecisionConfig::default());
        detector.register(DEFAULT_MODEL_NAME, FixedClassifier::scam(0.9));
        detector.register("Naive Bayes", FixedClassifier::legitimate(0.7));
        detector
    }

    fn predict(json: &str) -> Result<PredictResponse> {
        let request: PredictRequest = serde_json::from_str(json).unwrap();
        handle_predict(&detector(), request)
    }

    #[test]
    fn test_predict_defaults_to_random_forest() {
        let response = predict(r#"{"message": "Transfer sekarang ke rekening ini untuk klaim bonus"}"#).unwrap();
        assert!(response.success);
        assert_eq!(response.model, "Random Forest");
        assert!(response.is_scam);
        assert_eq!(response.classifier_confidence, 90.0);
        assert_eq!(response.risk_level, RiskLevel::Critical);
        assert_eq!(response.warning_level, WarningLevel::High);
        assert!(response.recommendation.starts_with("Kemungkinan besar"));
    }

    #[test]
    fn test_predict_with_named_model() {
        let response = predict(
            r#"{"message": "Rapat koordinasi diundur ke ruang besar lantai tiga minggu depan", "model_name": "Naive Bayes"}"#,
        )
        .unwrap();
        assert_eq!(response.final_label, Label::Legitimate);
        assert_eq!(response.risk_level, RiskLevel::Low);
        assert_eq!(response.recommendation, SAFE_RECOMMENDATION);
    }

    #[test]
    fn test_predict_validation() {
        let missing = predict("{}").unwrap_err();
        assert!(matches!(
            missing,
            ScamAlertError::Validation(ValidationError::MissingField("message"))
        ));
        assert_eq!(ErrorResponse::from(&missing).status, 400);
        assert_eq!(missing.to_string(), "Missing message field");

        let empty = predict(r#"{"message": "   "}"#).unwrap_err();
        assert_eq!(empty.to_string(), "Message cannot be empty");

        let unknown = predict(r#"{"message": "halo", "model_name": "SVM"}"#).unwrap_err();
        assert!(matches!(unknown, ScamAlertError::UnknownModel(_)));
        assert_eq!(ErrorResponse::from(&unknown).status, 500);
    }

    #[test]
    fn test_risk_level_bands() {
        assert_eq!(RiskLevel::assess(95.0, true), RiskLevel::Critical);
        assert_eq!(RiskLevel::assess(95.0, false), RiskLevel::Low);
        assert_eq!(RiskLevel::assess(70.0, true), RiskLevel::High);
        assert_eq!(RiskLevel::assess(70.0, false), RiskLevel::Low);
        assert_eq!(RiskLevel::assess(50.0, false), RiskLevel::Medium);
        assert_eq!(RiskLevel::assess(40.0, true), RiskLevel::Low);
    }

    #[test]
    fn test_batch_skips_blank_messages() {
        let request: BatchRequest =
            serde_json::from_str(r#"{"messages": ["Selamat pagi", "", "Selamat anda menang undian"]}"#)
                .unwrap();
        let response = handle_batch(&detector(), request).unwrap();
        assert_eq!(response.total, 2);
        assert_eq!(response.results[0].message, "Selamat pagi");
        assert_eq!(response.results[0].final_label, Label::Legitimate);
        assert_eq!(response.results[1].final_label, Label::Scam);

        let request: BatchRequest = serde_json::from_str("{}").unwrap();
        assert!(handle_batch(&detector(), request).is_err());
    }

    #[tokio::test]
    async fn test_ocr_request_flow() {
        let extractor = ImageTextExtractor::new(
            StaticOcr(vec![
                OcrWord {
                    text: "Selamat".to_string(),
                    confidence: 92.0,
                },
                OcrWord {
                    text: "anda".to_string(),
                    confidence: 88.0,
                },
            ]),
            &OcrSettings::default(),
        );
        let request = OcrRequest {
            filename: "chat.png".to_string(),
            image_base64: Some(STANDARD.encode(b"fake image bytes")),
        };
        let result = handle_ocr(&extractor, 1024, request).await.unwrap();
        assert!(result.success);
        assert_eq!(result.text, "Selamat anda");
        assert_eq!(result.confidence, 90.0);

        let bad_format = OcrRequest {
            filename: "chat.gif".to_string(),
            image_base64: Some(STANDARD.encode(b"x")),
        };
        assert!(matches!(
            handle_ocr(&extractor, 1024, bad_format).await,
            Err(ScamAlertError::Validation(ValidationError::UnsupportedFormat(_)))
        ));

        let too_big = OcrRequest {
            filename: "chat.png".to_string(),
            image_base64: Some(STANDARD.encode(vec![0u8; 2048])),
        };
        assert!(matches!(
            handle_ocr(&extractor, 1024, too_big).await,
            Err(ScamAlertError::Validation(ValidationError::FileTooLarge { .. }))
        ));

        let oversized_garbage = OcrRequest {
            filename: "chat.png".to_string(),
            image_base64: Some("!".repeat(4096)),
        };
        assert!(matches!(
            handle_ocr(&extractor, 1024, oversized_garbage).await,
            Err(ScamAlertError::Validation(ValidationError::FileTooLarge { size: 3072, limit: 1024 }))
        ));

        let at_limit = OcrRequest {
            filename: "chat.png".to_string(),
            image_base64: Some(STANDARD.encode(vec![0u8; 1024])),
        };
        assert!(handle_ocr(&extractor, 1024, at_limit).await.unwrap().success);

        let garbage = OcrRequest {
            filename: "chat.png".to_string(),
            image_base64: Some("not base64!!".to_string()),
        };
        assert!(matches!(
            handle_ocr(&extractor, 1024, garbage).await,
            Err(ScamAlertError::Validation(ValidationError::InvalidEncoding))
        ));
    }

    #[test]
    fn test_decoded_len_matches_decoder() {
        for size in [0usize, 1, 2, 3, 4, 5, 1023, 1024, 1025] {
            let encoded = STANDARD.encode(vec![7u8; size]);
            assert_eq!(decoded_len(&encoded), size, "{}", size);
        }
    }

    #[tokio::test]
    async fn test_health() {
        let extractor = ImageTextExtractor::new(StaticOcr(Vec::new()), &OcrSettings::default());
        let status = health(Some(&detector()), &extractor).await;
        assert_eq!(status.status, "ok");
        assert!(status.model_loaded);
        assert!(status.ocr_available);

        let status = health(None, &extractor).await;
        assert!(!status.model_loaded);
    }
}
