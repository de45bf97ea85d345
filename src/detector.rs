//! The scam detector facade.
//!
//! Holds the shared lexicon, the normalizer, the fusion engine and a registry
//! of named classifiers. Every prediction is independent; the detector has no
//! mutable state once built, so one instance can serve concurrent callers
//! behind an `Arc`.

use crate::components::{DecisionConfig, DecisionEngine, Verdict};
use crate::config::{Config, TrainingSettings};
use crate::detection::DetectionSignals;
use crate::error::{Result, ScamAlertError};
use crate::lexicon::{CompiledLexicon, Lexicon};
use crate::machine_learning::dataset::Dataset;
use crate::machine_learning::training::{train_models, TrainedModels, TrainingReport};
use crate::machine_learning::{Classifier, TextModel};
use crate::model_store::{ModelArtifact, ARTIFACT_VERSION};
use crate::normalization::{DelegateKind, TextNormalizer};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

pub struct ScamDetector {
    lexicon: Arc<CompiledLexicon>,
    normalizer: TextNormalizer,
    engine: DecisionEngine,
    config: DecisionConfig,
    models: BTreeMap<String, Arc<dyn Classifier>>,
    best_model: Option<String>,
    trained: Option<TrainedModels>,
}

impl ScamDetector {
    pub fn new(lexicon: Arc<CompiledLexicon>, config: DecisionConfig) -> Self {
        Self {
            lexicon,
            normalizer: TextNormalizer::with_delegate(DelegateKind::Stopword.delegate()),
            engine: DecisionEngine::new(config),
            config,
            models: BTreeMap::new(),
            best_model: None,
            trained: None,
        }
    }

    /// Builds an untrained detector from the configured lexicon and engine
    /// settings.
    pub fn from_config(config: &Config) -> Result<Self> {
        let lexicon = match &config.lexicon_path {
            Some(path) => {
                log::info!("Loading lexicon from {}", path);
                Lexicon::load_from_file(path)?
            }
            None => Lexicon::default(),
        };
        let compiled = lexicon.compile()?;
        log::info!(
            "Lexicon ready: {} indicators, {} critical patterns, {} suspicious domain patterns",
            compiled.indicator_count(),
            compiled.critical_pattern_count(),
            compiled.suspicious_domain_count()
        );
        Ok(Self::new(Arc::new(compiled), DecisionConfig::from(&config.engine)))
    }

    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Adds a classifier under `name`. The first registered classifier
    /// becomes the default until another is chosen.
    pub fn register(&mut self, name: &str, classifier: Arc<dyn Classifier>) {
        log::debug!("Registering classifier '{}' ({})", name, classifier.family());
        self.models.insert(name.to_string(), classifier);
        if self.best_model.is_none() {
            self.best_model = Some(name.to_string());
        }
    }

    pub fn set_best_model(&mut self, name: &str) -> Result<()> {
        if !self.models.contains_key(name) {
            return Err(ScamAlertError::UnknownModel(name.to_string()));
        }
        self.best_model = Some(name.to_string());
        Ok(())
    }

    /// Routes predictions that name no model to `name` when it is loaded.
    /// Otherwise the current choice stays.
    pub fn apply_default_model(&mut self, name: &str) {
        match self.set_best_model(name) {
            Ok(()) => log::debug!("Default model set to '{}'", name),
            Err(_) => log::warn!(
                "Default model '{}' is not loaded, using '{}'",
                name,
                self.best_model.as_deref().unwrap_or("none")
            ),
        }
    }

    /// Trains every built-in estimator on `dataset` and registers them,
    /// replacing any previously trained set.
    pub fn train(&mut self, dataset: &Dataset, settings: &TrainingSettings) -> Result<TrainingReport> {
        let (trained, report) = train_models(
            dataset,
            &self.normalizer,
            settings,
            self.config.short_text_threshold,
        )?;
        self.install(trained);
        Ok(report)
    }

    fn install(&mut self, trained: TrainedModels) {
        let vectorizer = Arc::new(trained.vectorizer.clone());
        for (name, estimator) in &trained.estimators {
            let model = TextModel::new(Arc::clone(&vectorizer), estimator.clone());
            self.register(name, Arc::new(model));
        }
        self.best_model = Some(trained.best_model.clone());
        self.trained = Some(trained);
    }

    pub fn predict(&self, message: &str, model_name: Option<&str>) -> Result<Verdict> {
        let name = match model_name {
            Some(name) => name,
            None => self.best_model.as_deref().ok_or(ScamAlertError::NoModelLoaded)?,
        };
        let classifier = self
            .models
            .get(name)
            .ok_or_else(|| ScamAlertError::UnknownModel(name.to_string()))?;

        let signals = DetectionSignals::analyze(&self.lexicon, message);
        let normalized = self.normalizer.normalize(message);
        let classification = classifier.classify(&normalized);

        Ok(self.engine.make_decision(signals, &classification, name))
    }

    /// One verdict per non-blank message, in input order.
    pub fn batch_predict<S: AsRef<str>>(
        &self,
        messages: &[S],
        model_name: Option<&str>,
    ) -> Result<Vec<Verdict>> {
        messages
            .iter()
            .map(|m| m.as_ref())
            .filter(|m| !m.trim().is_empty())
            .map(|m| self.predict(m, model_name))
            .collect()
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.models.keys().map(|name| name.as_str()).collect()
    }

    pub fn best_model(&self) -> Option<&str> {
        self.best_model.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        !self.models.is_empty()
    }

    pub fn lexicon(&self) -> &CompiledLexicon {
        &self.lexicon
    }

    pub fn decision_config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Persists the trained estimators. Classifiers added with
    /// [`register`](Self::register) from outside are not part of the artifact,
    /// and a normalizer with a custom delegate cannot be saved.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let trained = self.trained.as_ref().ok_or(ScamAlertError::NoModelLoaded)?;
        let delegate = self.normalizer.delegate_kind().ok_or_else(|| {
            ScamAlertError::Serialization(
                "the normalizer uses a custom text delegate that cannot be saved".to_string(),
            )
        })?;
        let best_model_name = match &self.best_model {
            Some(name) if trained.estimators.contains_key(name) => name.clone(),
            _ => trained.best_model.clone(),
        };
        let artifact = ModelArtifact {
            version: ARTIFACT_VERSION,
            vectorizer: trained.vectorizer.clone(),
            models: trained.estimators.clone(),
            best_model_name,
            delegate,
            lexicon: self.lexicon.source().clone(),
            short_text_threshold: self.config.short_text_threshold,
            min_confidence_threshold: self.config.min_confidence_threshold,
        };
        artifact.save(path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let artifact = ModelArtifact::load(path)?;
        let lexicon = artifact.lexicon.compile()?;
        let config = DecisionConfig {
            short_text_threshold: artifact.short_text_threshold,
            min_confidence_threshold: artifact.min_confidence_threshold,
        };
        let normalizer = TextNormalizer::with_delegate(artifact.delegate.delegate());
        let mut detector = Self::new(Arc::new(lexicon), config).with_normalizer(normalizer);
        detector.install(TrainedModels {
            vectorizer: artifact.vectorizer,
            estimators: artifact.models,
            best_model: artifact.best_model_name,
        });
        Ok(detector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine_learning::testing::FixedClassifier;
    use crate::machine_learning::Label;
    use crate::normalization::{NoopDelegate, TextDelegate};
    use std::thread;

    const HELD_OUT: [&str; 7] = [
        "Selamat! Anda menang undian Rp50.000.000!",
        "Meeting besok jam 2 siang. Jangan lupa bawa proposal",
        "Paket Anda tertahan, bayar ongkir di www.kirim-paket.com",
        "Paket yang dari kantor untuk anda sudah dikirim dan ada di gudang",
        "Terima kasih",
        "Investasi aman profit 30% per bulan, hubungi WA 08123456789",
        "Jadwal kuliah besok dimulai jam 8 pagi di ruang 301",
    ];

    fn assert_same_verdicts(original: &ScamDetector, loaded: &ScamDetector) {
        for name in original.model_names() {
            for message in HELD_OUT {
                let a = original.predict(message, Some(name)).unwrap();
                let b = loaded.predict(message, Some(name)).unwrap();
                assert_eq!(a, b, "{} / {}", name, message);
                assert_eq!(a.scam_probability.to_bits(), b.scam_probability.to_bits());
            }
        }
    }

    fn detector() -> ScamDetector {
        let lexicon = Lexicon::default().compile().unwrap();
        let mut detector = ScamDetector::new(Arc::new(lexicon), DecisionConfig::default());
        detector.register("Fixed", FixedClassifier::legitimate(0.99));
        detector
    }

    fn quick_settings() -> TrainingSettings {
        TrainingSettings {
            n_estimators: 10,
            max_depth: 10,
            logistic_max_iter: 200,
            cv_folds: 0,
            ..TrainingSettings::default()
        }
    }

    #[test]
    fn test_lottery_scenario() {
        let verdict = detector()
            .predict(
                "Selamat! Anda menang undian Rp50.000.000! Transfer biaya admin Rp500rb ke 081234567890",
                None,
            )
            .unwrap();
        assert_eq!(verdict.final_label, Label::Scam);
        assert!(verdict.adjusted);
        assert!(verdict.signals.critical_count >= 1);
        assert!(verdict.signals.indicator_count >= 3);
        assert_eq!(verdict.model_used, "Fixed");
    }

    #[test]
    fn test_meeting_scenario() {
        let verdict = detector()
            .predict("Meeting besok jam 2 siang. Jangan lupa bawa proposal", None)
            .unwrap();
        assert_eq!(verdict.final_label, Label::Legitimate);
        assert_eq!(verdict.signals.critical_count, 0);
        assert_eq!(verdict.signals.indicator_count, 0);
        assert!(!verdict.adjusted);
    }

    #[test]
    fn test_unknown_and_missing_models() {
        let d = detector();
        assert!(matches!(
            d.predict("halo", Some("Random Forest")),
            Err(ScamAlertError::UnknownModel(name)) if name == "Random Forest"
        ));

        let lexicon = Lexicon::default().compile().unwrap();
        let empty = ScamDetector::new(Arc::new(lexicon), DecisionConfig::default());
        assert!(matches!(empty.predict("halo", None), Err(ScamAlertError::NoModelLoaded)));
        assert!(matches!(empty.save("unused.json"), Err(ScamAlertError::NoModelLoaded)));
    }

    #[test]
    fn test_malformed_input_is_total() {
        let d = detector();
        for message in ["", "   ", "!!!???...", "\u{1F600}"] {
            assert!(d.predict(message, None).is_ok(), "{:?}", message);
        }
    }

    #[test]
    fn test_batch_skips_blank_and_keeps_order() {
        let d = detector();
        let messages = ["Selamat pagi", "", "   ", "Selamat anda menang undian"];
        let verdicts = d.batch_predict(&messages, None).unwrap();
        assert_eq!(verdicts.len(), 2);
        assert_eq!(verdicts[0].final_label, Label::Legitimate);
        assert_eq!(verdicts[1].final_label, Label::Scam);
    }

    #[test]
    fn test_custom_lexicon_swaps_behaviour() {
        let lexicon = Lexicon {
            critical_patterns: vec![r"rapat.*darurat".to_string()],
            ..Lexicon::default()
        };
        let mut d = ScamDetector::new(Arc::new(lexicon.compile().unwrap()), DecisionConfig::default());
        d.register("Fixed", FixedClassifier::legitimate(0.99));
        let verdict = d.predict("Rapat darurat di kantor pusat hari ini", None).unwrap();
        assert_eq!(verdict.final_label, Label::Scam);
        assert_eq!(verdict.adjustment_reason, "CRITICAL SCAM PATTERN: rapat.*darurat");
    }

    #[test]
    fn test_trained_detector_round_trips() {
        let lexicon = Lexicon::default().compile().unwrap();
        let mut original = ScamDetector::new(Arc::new(lexicon), DecisionConfig::default());
        let report = original.train(&Dataset::builtin(42), &quick_settings()).unwrap();
        assert_eq!(original.best_model(), Some(report.best_model.as_str()));
        assert_eq!(original.model_names().len(), 3);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        original.save(&path).unwrap();
        let loaded = ScamDetector::load(&path).unwrap();

        assert_eq!(loaded.best_model(), original.best_model());
        assert_eq!(loaded.decision_config(), original.decision_config());
        assert_same_verdicts(&original, &loaded);
    }

    #[test]
    fn test_noop_delegate_survives_reload() {
        let lexicon = Lexicon::default().compile().unwrap();
        let mut original = ScamDetector::new(Arc::new(lexicon), DecisionConfig::default())
            .with_normalizer(TextNormalizer::with_delegate(Arc::new(NoopDelegate)));
        original.train(&Dataset::builtin(42), &quick_settings()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        original.save(&path).unwrap();
        let loaded = ScamDetector::load(&path).unwrap();

        assert_eq!(loaded.normalizer.delegate_kind(), Some(DelegateKind::Noop));
        assert_same_verdicts(&original, &loaded);
    }

    #[test]
    fn test_custom_delegate_is_not_saved() {
        struct Passthrough;

        impl TextDelegate for Passthrough {
            fn remove_stopwords(&self, text: &str) -> String {
                text.to_string()
            }

            fn stem(&self, text: &str) -> String {
                text.to_string()
            }
        }

        let lexicon = Lexicon::default().compile().unwrap();
        let mut d = ScamDetector::new(Arc::new(lexicon), DecisionConfig::default())
            .with_normalizer(TextNormalizer::with_delegate(Arc::new(Passthrough)));
        d.train(&Dataset::builtin(42), &quick_settings()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        assert!(matches!(d.save(&path), Err(ScamAlertError::Serialization(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_default_model_selection() {
        let mut d = detector();
        d.register("Strict", FixedClassifier::scam(0.95));
        assert_eq!(d.best_model(), Some("Fixed"));

        assert!(matches!(
            d.set_best_model("SVM"),
            Err(ScamAlertError::UnknownModel(name)) if name == "SVM"
        ));
        d.apply_default_model("SVM");
        assert_eq!(d.best_model(), Some("Fixed"));

        d.apply_default_model("Strict");
        assert_eq!(d.best_model(), Some("Strict"));
        let verdict = d
            .predict("Rapat koordinasi diundur ke ruang besar lantai tiga minggu depan", None)
            .unwrap();
        assert_eq!(verdict.model_used, "Strict");
        assert_eq!(verdict.final_label, Label::Scam);
    }

    #[test]
    fn test_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScamDetector>();

        let d = Arc::new(detector());
        let handles: Vec<_> = HELD_OUT
            .iter()
            .map(|&message| {
                let d = Arc::clone(&d);
                thread::spawn(move || d.predict(message, None).unwrap())
            })
            .collect();
        let parallel: Vec<Verdict> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        for (message, verdict) in HELD_OUT.iter().zip(&parallel) {
            assert_eq!(verdict, &d.predict(message, None).unwrap());
        }
    }
}
