//! On-disk model artifact.
//!
//! One JSON document holds everything needed to rebuild a detector that gives
//! the same verdicts as the one that saved it: the vectorizer, every trained
//! estimator, the text delegate, the lexicon and the engine thresholds.

use crate::error::{Result, ScamAlertError};
use crate::lexicon::Lexicon;
use crate::machine_learning::{Estimator, TfidfVectorizer};
use crate::normalization::DelegateKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: u32,
    pub vectorizer: TfidfVectorizer,
    pub models: BTreeMap<String, Estimator>,
    pub best_model_name: String,
    /// Artifacts written before this field existed were all trained with
    /// the stopword delegate.
    #[serde(default)]
    pub delegate: DelegateKind,
    pub lexicon: Lexicon,
    pub short_text_threshold: usize,
    pub min_confidence_threshold: f64,
}

impl ModelArtifact {
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        log::info!("Model saved to {}", path.display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let artifact: ModelArtifact = serde_json::from_reader(reader)?;

        if artifact.version != ARTIFACT_VERSION {
            return Err(ScamAlertError::Serialization(format!(
                "unsupported model artifact version {} (expected {})",
                artifact.version, ARTIFACT_VERSION
            )));
        }
        if !artifact.models.contains_key(&artifact.best_model_name) {
            return Err(ScamAlertError::UnknownModel(artifact.best_model_name));
        }

        log::info!(
            "Model loaded from {} ({} classifiers, best: {})",
            path.display(),
            artifact.models.len(),
            artifact.best_model_name
        );
        Ok(artifact)
    }
}
