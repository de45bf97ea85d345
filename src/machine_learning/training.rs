use super::dataset::Dataset;
use super::random_forest::ForestParams;
use super::{
    Estimator, Label, LogisticRegression, MultinomialNb, RandomForest, SparseVector,
    TfidfVectorizer,
};
use crate::config::TrainingSettings;
use crate::error::{Result, ScamAlertError};
use crate::normalization::TextNormalizer;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NAIVE_BAYES: &str = "Naive Bayes";
pub const LOGISTIC_REGRESSION: &str = "Logistic Regression";
pub const RANDOM_FOREST: &str = "Random Forest";

/// Training order; also the tie-break order when picking the best model.
pub const MODEL_NAMES: [&str; 3] = [NAIVE_BAYES, LOGISTIC_REGRESSION, RANDOM_FOREST];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub name: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub cv_mean: f64,
    pub cv_std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_samples: usize,
    pub test_samples: usize,
    pub feature_count: usize,
    pub short_text_samples: usize,
    pub metrics: Vec<ModelMetrics>,
    pub best_model: String,
}

impl TrainingReport {
    pub fn metrics_for(&self, name: &str) -> Option<&ModelMetrics> {
        self.metrics.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModels {
    pub vectorizer: TfidfVectorizer,
    pub estimators: BTreeMap<String, Estimator>,
    pub best_model: String,
}

/// Normalizes the dataset, fits the vectorizer on a stratified training
/// split and trains every estimator in [`MODEL_NAMES`] against it.
pub fn train_models(
    dataset: &Dataset,
    normalizer: &TextNormalizer,
    settings: &TrainingSettings,
    short_text_threshold: usize,
) -> Result<(TrainedModels, TrainingReport)> {
    for label in [Label::Scam, Label::Legitimate] {
        if dataset.count(label) < 2 {
            return Err(ScamAlertError::Training(format!(
                "dataset needs at least two {} samples, found {}",
                label,
                dataset.count(label)
            )));
        }
    }

    let texts: Vec<String> = dataset
        .samples
        .iter()
        .map(|sample| normalizer.normalize(&sample.text))
        .collect();
    let labels: Vec<Label> = dataset.samples.iter().map(|sample| sample.label).collect();

    let short_text_samples = dataset
        .samples
        .iter()
        .filter(|sample| sample.text.split_whitespace().count() <= short_text_threshold)
        .count();

    let (train_idx, test_idx) = stratified_split(&labels, settings.test_size, settings.seed);
    log::info!(
        "Training on {} samples, evaluating on {} ({} short texts in dataset)",
        train_idx.len(),
        test_idx.len(),
        short_text_samples
    );

    let train_docs: Vec<String> = train_idx.iter().map(|&i| texts[i].clone()).collect();
    let vectorizer = TfidfVectorizer::fit(&train_docs, settings.min_df, settings.max_features);
    let n_features = vectorizer.feature_count();
    if n_features == 0 {
        return Err(ScamAlertError::Training(
            "vectorizer produced an empty vocabulary".to_string(),
        ));
    }

    let x_train: Vec<SparseVector> = train_docs.iter().map(|t| vectorizer.transform(t)).collect();
    let y_train: Vec<Label> = train_idx.iter().map(|&i| labels[i]).collect();
    let x_test: Vec<SparseVector> = test_idx
        .iter()
        .map(|&i| vectorizer.transform(&texts[i]))
        .collect();
    let y_test: Vec<Label> = test_idx.iter().map(|&i| labels[i]).collect();

    let mut estimators = BTreeMap::new();
    let mut metrics = Vec::with_capacity(MODEL_NAMES.len());

    for name in MODEL_NAMES {
        let estimator = fit_estimator(name, &x_train, &y_train, n_features, settings);
        let predicted: Vec<Label> = x_test.iter().map(|row| estimator.predict(row)).collect();
        let (cv_mean, cv_std) =
            cross_validate(name, &x_train, &y_train, n_features, settings);

        let mut model_metrics = score(name, &y_test, &predicted);
        model_metrics.cv_mean = cv_mean;
        model_metrics.cv_std = cv_std;

        log::info!(
            "{}: accuracy {:.4}, f1 {:.4}, cv {:.4} (+/- {:.4})",
            name,
            model_metrics.accuracy,
            model_metrics.f1,
            cv_mean,
            cv_std * 2.0
        );

        metrics.push(model_metrics);
        estimators.insert(name.to_string(), estimator);
    }

    let mut best = &metrics[0];
    for candidate in &metrics[1..] {
        if candidate.accuracy > best.accuracy {
            best = candidate;
        }
    }
    let best_model = best.name.clone();
    log::info!("Best model: {} ({:.4} accuracy)", best_model, best.accuracy);

    let report = TrainingReport {
        train_samples: train_idx.len(),
        test_samples: test_idx.len(),
        feature_count: n_features,
        short_text_samples,
        metrics,
        best_model: best_model.clone(),
    };

    Ok((
        TrainedModels {
            vectorizer,
            estimators,
            best_model,
        },
        report,
    ))
}

fn fit_estimator(
    name: &str,
    x: &[SparseVector],
    y: &[Label],
    n_features: usize,
    settings: &TrainingSettings,
) -> Estimator {
    match name {
        NAIVE_BAYES => Estimator::NaiveBayes(MultinomialNb::fit(
            x,
            y,
            n_features,
            settings.naive_bayes_alpha,
        )),
        LOGISTIC_REGRESSION => Estimator::LogisticRegression(LogisticRegression::fit(
            x,
            y,
            n_features,
            settings.logistic_c,
            settings.logistic_max_iter,
        )),
        _ => Estimator::RandomForest(RandomForest::fit(
            x,
            y,
            n_features,
            ForestParams {
                n_estimators: settings.n_estimators,
                max_depth: settings.max_depth,
                seed: settings.seed,
            },
        )),
    }
}

/// Per-class seeded split; every class keeps at least one sample on each side.
fn stratified_split(labels: &[Label], test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for label in [Label::Legitimate, Label::Scam] {
        let mut indices: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == label).collect();
        indices.shuffle(&mut rng);
        let n_test = ((indices.len() as f64 * test_size).round() as usize)
            .clamp(1, indices.len().saturating_sub(1));
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Stratified k-fold accuracy on the training split. Returns `(0, 0)` when
/// disabled or when a class is too small to appear in every fold.
fn cross_validate(
    name: &str,
    x: &[SparseVector],
    y: &[Label],
    n_features: usize,
    settings: &TrainingSettings,
) -> (f64, f64) {
    let k = settings.cv_folds;
    if k < 2 {
        return (0.0, 0.0);
    }

    let mut fold_of = vec![0usize; y.len()];
    for label in [Label::Legitimate, Label::Scam] {
        let members: Vec<usize> = (0..y.len()).filter(|&i| y[i] == label).collect();
        if members.len() < k {
            log::debug!("Skipping cross-validation for {}: too few {} samples", name, label);
            return (0.0, 0.0);
        }
        for (position, &i) in members.iter().enumerate() {
            fold_of[i] = position % k;
        }
    }

    let scores: Vec<f64> = (0..k)
        .map(|fold| {
            let (mut fx, mut fy, mut vx, mut vy) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
            for i in 0..y.len() {
                if fold_of[i] == fold {
                    vx.push(x[i].clone());
                    vy.push(y[i]);
                } else {
                    fx.push(x[i].clone());
                    fy.push(y[i]);
                }
            }
            let estimator = fit_estimator(name, &fx, &fy, n_features, settings);
            let predicted: Vec<Label> = vx.iter().map(|row| estimator.predict(row)).collect();
            accuracy(&vy, &predicted)
        })
        .collect();

    let mean = scores.iter().sum::<f64>() / k as f64;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / k as f64;
    (mean, variance.sqrt())
}

fn accuracy(truth: &[Label], predicted: &[Label]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    correct as f64 / truth.len() as f64
}

/// Accuracy plus support-weighted precision, recall and F1.
fn score(name: &str, truth: &[Label], predicted: &[Label]) -> ModelMetrics {
    let total = truth.len() as f64;
    let (mut precision, mut recall, mut f1) = (0.0, 0.0, 0.0);

    for label in [Label::Legitimate, Label::Scam] {
        let support = truth.iter().filter(|&&t| t == label).count() as f64;
        if support == 0.0 {
            continue;
        }
        let predicted_count = predicted.iter().filter(|&&p| p == label).count() as f64;
        let true_positive = truth
            .iter()
            .zip(predicted)
            .filter(|&(&t, &p)| t == label && p == label)
            .count() as f64;

        let p = if predicted_count > 0.0 {
            true_positive / predicted_count
        } else {
            0.0
        };
        let r = true_positive / support;
        let f = if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };

        let weight = support / total;
        precision += weight * p;
        recall += weight * r;
        f1 += weight * f;
    }

    ModelMetrics {
        name: name.to_string(),
        accuracy: accuracy(truth, predicted),
        precision,
        recall,
        f1,
        cv_mean: 0.0,
        cv_std: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_settings() -> TrainingSettings {
        TrainingSettings {
            n_estimators: 10,
            max_depth: 10,
            logistic_max_iter: 200,
            cv_folds: 3,
            ..TrainingSettings::default()
        }
    }

    #[test]
    fn test_trains_all_three_models() {
        let dataset = Dataset::builtin(42);
        let (models, report) =
            train_models(&dataset, &TextNormalizer::new(), &quick_settings(), 5).unwrap();

        assert_eq!(models.estimators.len(), 3);
        for name in MODEL_NAMES {
            assert!(models.estimators.contains_key(name));
            let metrics = report.metrics_for(name).unwrap();
            assert!((0.0..=1.0).contains(&metrics.accuracy));
            assert!((0.0..=1.0).contains(&metrics.f1));
            assert!(metrics.cv_mean > 0.0);
        }
        assert_eq!(report.train_samples + report.test_samples, dataset.len());
        assert_eq!(models.best_model, report.best_model);

        let best = report.metrics_for(&report.best_model).unwrap();
        assert!(best.accuracy >= 0.8, "best accuracy {}", best.accuracy);
    }

    #[test]
    fn test_training_is_deterministic() {
        let dataset = Dataset::builtin(7);
        let settings = quick_settings();
        let normalizer = TextNormalizer::new();
        let (a, report_a) = train_models(&dataset, &normalizer, &settings, 5).unwrap();
        let (b, report_b) = train_models(&dataset, &normalizer, &settings, 5).unwrap();
        assert_eq!(a, b);
        assert_eq!(report_a, report_b);
    }

    #[test]
    fn test_missing_class_is_an_error() {
        let dataset = Dataset::from_messages(&["menang undian", "transfer sekarang"], &[], 1);
        let result = train_models(&dataset, &TextNormalizer::new(), &quick_settings(), 5);
        assert!(matches!(result, Err(ScamAlertError::Training(_))));
    }

    #[test]
    fn test_stratified_split_keeps_both_classes() {
        let labels = vec![
            Label::Scam,
            Label::Scam,
            Label::Scam,
            Label::Legitimate,
            Label::Legitimate,
        ];
        let (train, test) = stratified_split(&labels, 0.2, 3);
        assert_eq!(train.len() + test.len(), labels.len());
        for side in [&train, &test] {
            assert!(side.iter().any(|&i| labels[i] == Label::Scam));
            assert!(side.iter().any(|&i| labels[i] == Label::Legitimate));
        }
    }

    #[test]
    fn test_weighted_scores() {
        let truth = [Label::Scam, Label::Scam, Label::Legitimate, Label::Legitimate];
        let predicted = [Label::Scam, Label::Legitimate, Label::Legitimate, Label::Legitimate];
        let metrics = score("x", &truth, &predicted);
        assert_eq!(metrics.accuracy, 0.75);
        // scam: p=1, r=0.5; legitimate: p=2/3, r=1
        assert!((metrics.precision - (0.5 * 1.0 + 0.5 * 2.0 / 3.0)).abs() < 1e-12);
        assert!((metrics.recall - 0.75).abs() < 1e-12);
    }
}
