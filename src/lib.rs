pub mod api;
pub mod components;
pub mod config;
pub mod detection;
pub mod detector;
pub mod error;
pub mod lexicon;
pub mod machine_learning;
pub mod model_store;
pub mod normalization;
pub mod ocr;

pub use components::{Verdict, WarningLevel};
pub use config::Config;
pub use detection::DetectionSignals;
pub use detector::ScamDetector;
pub use error::{Result, ScamAlertError, ValidationError};
pub use lexicon::{CompiledLexicon, Lexicon};
pub use machine_learning::{Classification, Classifier, Label};
pub use normalization::TextNormalizer;
pub use ocr::{ImageTextExtractor, OcrExtraction, TesseractBackend};
