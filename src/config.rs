use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MODEL_NAME: &str = "Random Forest";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Optional YAML lexicon replacing the built-in keyword sets.
    #[serde(default)]
    pub lexicon_path: Option<String>,
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub ocr: OcrSettings,
}

fn default_model_path() -> String {
    "scam_detector_model.json".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            engine: EngineSettings::default(),
            model_path: default_model_path(),
            lexicon_path: None,
            training: TrainingSettings::default(),
            ocr: OcrSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Messages with at most this many words get the short-text overrides.
    pub short_text_threshold: usize,
    /// Persisted with the model; the cascade itself does not consult it.
    pub min_confidence_threshold: f64,
    /// Classifier used when a prediction names none. When it is not among
    /// the loaded models the best trained model is used instead.
    pub default_model: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            short_text_threshold: 5,
            min_confidence_threshold: 60.0,
            default_model: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    pub test_size: f64,
    pub seed: u64,
    pub max_features: usize,
    pub min_df: usize,
    pub naive_bayes_alpha: f64,
    pub logistic_c: f64,
    pub logistic_max_iter: usize,
    pub n_estimators: usize,
    pub max_depth: usize,
    pub cv_folds: usize,
    pub dataset_path: Option<String>,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            max_features: 1000,
            min_df: 2,
            naive_bayes_alpha: 0.1,
            logistic_c: 1.0,
            logistic_max_iter: 1000,
            n_estimators: 100,
            max_depth: 20,
            cv_folds: 5,
            dataset_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    pub command: String,
    pub languages: String,
    pub max_file_size: usize,
    /// Words recognised with confidence at or below this are discarded.
    pub min_word_confidence: f64,
    /// Below this average confidence the unprocessed image is tried too.
    pub fallback_confidence: f64,
    pub timeout_seconds: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            languages: "ind+eng".to_string(),
            max_file_size: 10 * 1024 * 1024,
            min_word_confidence: 30.0,
            fallback_confidence: 40.0,
            timeout_seconds: 30,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let test_size = self.training.test_size;
        if test_size <= 0.0 || test_size >= 1.0 {
            anyhow::bail!(
                "training.test_size must be between 0 and 1, got {}",
                test_size
            );
        }
        if self.training.cv_folds == 1 {
            anyhow::bail!("training.cv_folds must be 0 (disabled) or at least 2");
        }
        if self.ocr.max_file_size == 0 {
            anyhow::bail!("ocr.max_file_size must be positive");
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
