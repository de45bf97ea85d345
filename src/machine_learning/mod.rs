//! Statistical text classification.
//!
//! The fusion engine only sees the [`Classifier`] trait: normalized text in,
//! a label and optional class probabilities out. [`TextModel`] is the
//! concrete implementation backed by a TF-IDF vectorizer and one of the
//! trained [`Estimator`]s.

pub mod dataset;
pub mod logistic_regression;
pub mod naive_bayes;
pub mod random_forest;
pub mod training;
pub mod vectorizer;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub use logistic_regression::LogisticRegression;
pub use naive_bayes::MultinomialNb;
pub use random_forest::RandomForest;
pub use vectorizer::{SparseVector, TfidfVectorizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Legitimate,
    Scam,
}

impl Label {
    /// Position in per-class arrays: legitimate first, scam second.
    pub fn index(self) -> usize {
        match self {
            Label::Legitimate => 0,
            Label::Scam => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Legitimate => "legitimate",
            Label::Scam => "scam",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub legitimate: f64,
    pub scam: f64,
}

impl ClassProbabilities {
    pub fn from_array(p: [f64; 2]) -> Self {
        Self {
            legitimate: p[0],
            scam: p[1],
        }
    }

    /// Arg-max label; ties resolve to legitimate.
    pub fn label(&self) -> Label {
        if self.scam > self.legitimate {
            Label::Scam
        } else {
            Label::Legitimate
        }
    }

    pub fn max(&self) -> f64 {
        self.scam.max(self.legitimate)
    }
}

/// Raw classifier answer. `probabilities` is `None` for classifiers that
/// only produce a label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: Label,
    pub probabilities: Option<ClassProbabilities>,
}

impl Classification {
    pub fn from_probabilities(probabilities: ClassProbabilities) -> Self {
        Self {
            label: probabilities.label(),
            probabilities: Some(probabilities),
        }
    }

    pub fn label_only(label: Label) -> Self {
        Self {
            label,
            probabilities: None,
        }
    }

    /// Confidence and scam probability, both in percent. Label-only
    /// classifiers are taken as fully confident in their label.
    pub fn percentages(&self) -> (f64, f64) {
        match self.probabilities {
            Some(p) => (p.max() * 100.0, p.scam * 100.0),
            None => {
                let scam = if self.label == Label::Scam { 100.0 } else { 0.0 };
                (100.0, scam)
            }
        }
    }
}

pub trait Classifier: Send + Sync {
    fn classify(&self, normalized_text: &str) -> Classification;

    fn family(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    NaiveBayes(MultinomialNb),
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

impl Estimator {
    pub fn predict_proba(&self, x: &SparseVector) -> ClassProbabilities {
        let p = match self {
            Estimator::NaiveBayes(model) => model.predict_proba(x),
            Estimator::LogisticRegression(model) => model.predict_proba(x),
            Estimator::RandomForest(model) => model.predict_proba(x),
        };
        ClassProbabilities::from_array(p)
    }

    pub fn predict(&self, x: &SparseVector) -> Label {
        self.predict_proba(x).label()
    }

    pub fn family(&self) -> &'static str {
        match self {
            Estimator::NaiveBayes(_) => "multinomial naive bayes",
            Estimator::LogisticRegression(_) => "logistic regression",
            Estimator::RandomForest(_) => "random forest",
        }
    }
}

/// A trained estimator paired with the vectorizer it was fitted against.
pub struct TextModel {
    vectorizer: Arc<TfidfVectorizer>,
    estimator: Estimator,
}

impl TextModel {
    pub fn new(vectorizer: Arc<TfidfVectorizer>, estimator: Estimator) -> Self {
        Self {
            vectorizer,
            estimator,
        }
    }
}

impl Classifier for TextModel {
    fn classify(&self, normalized_text: &str) -> Classification {
        let features = self.vectorizer.transform(normalized_text);
        Classification::from_probabilities(self.estimator.predict_proba(&features))
    }

    fn family(&self) -> &str {
        self.estimator.family()
    }
}

/// Deterministic classifier double for engine-level tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub struct FixedClassifier(pub Classification);

    impl FixedClassifier {
        pub fn legitimate(confidence: f64) -> Arc<dyn Classifier> {
            Arc::new(Self(Classification::from_probabilities(ClassProbabilities {
                legitimate: confidence,
                scam: 1.0 - confidence,
            })))
        }

        pub fn scam(confidence: f64) -> Arc<dyn Classifier> {
            Arc::new(Self(Classification::from_probabilities(ClassProbabilities {
                legitimate: 1.0 - confidence,
                scam: confidence,
            })))
        }
    }

    impl Classifier for FixedClassifier {
        fn classify(&self, _normalized_text: &str) -> Classification {
            self.0
        }

        fn family(&self) -> &str {
            "fixed"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentages_with_probabilities() {
        let c = Classification::from_probabilities(ClassProbabilities {
            legitimate: 0.25,
            scam: 0.75,
        });
        assert_eq!(c.label, Label::Scam);
        assert_eq!(c.percentages(), (75.0, 75.0));
    }

    #[test]
    fn test_percentages_label_only() {
        assert_eq!(Classification::label_only(Label::Scam).percentages(), (100.0, 100.0));
        assert_eq!(
            Classification::label_only(Label::Legitimate).percentages(),
            (100.0, 0.0)
        );
    }

    #[test]
    fn test_tie_is_legitimate() {
        let p = ClassProbabilities {
            legitimate: 0.5,
            scam: 0.5,
        };
        assert_eq!(p.label(), Label::Legitimate);
    }

    #[test]
    fn test_label_serde() {
        assert_eq!(serde_json::to_string(&Label::Scam).unwrap(), "\"scam\"");
        let label: Label = serde_json::from_str("\"legitimate\"").unwrap();
        assert_eq!(label, Label::Legitimate);
    }
}
