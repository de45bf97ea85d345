use thiserror::Error;

/// Errors surfaced by the detector and its collaborators.
#[derive(Debug, Error)]
pub enum ScamAlertError {
    #[error("model '{0}' has not been trained or loaded")]
    UnknownModel(String),

    #[error("no classifier is loaded; train or load a model first")]
    NoModelLoaded,

    #[error("invalid {kind} pattern '{pattern}': {source}")]
    InvalidPattern {
        kind: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("training failed: {0}")]
    Training(String),

    #[error("OCR extraction failed: {0}")]
    Ocr(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ScamAlertError {
    fn from(e: serde_json::Error) -> Self {
        ScamAlertError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for ScamAlertError {
    fn from(e: serde_yaml::Error) -> Self {
        ScamAlertError::Serialization(e.to_string())
    }
}

/// Caller-side input problems, rejected before anything reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Missing {0} field")]
    MissingField(&'static str),

    #[error("No file selected")]
    NoFileSelected,

    #[error("Invalid file format '{0}'. Use PNG, JPG, JPEG, BMP, TIFF, or WEBP")]
    UnsupportedFormat(String),

    #[error("File too large: {size} bytes (max {limit} bytes)")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Image payload is not valid base64")]
    InvalidEncoding,
}

pub type Result<T> = std::result::Result<T, ScamAlertError>;
