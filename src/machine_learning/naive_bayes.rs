use super::{Label, SparseVector};
use serde::{Deserialize, Serialize};

/// Multinomial naive Bayes over TF-IDF weights with additive smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    class_log_prior: [f64; 2],
    feature_log_prob: [Vec<f64>; 2],
}

impl MultinomialNb {
    pub fn fit(x: &[SparseVector], y: &[Label], n_features: usize, alpha: f64) -> Self {
        let mut class_count = [0.0f64; 2];
        let mut feature_count = [vec![0.0; n_features], vec![0.0; n_features]];

        for (row, label) in x.iter().zip(y) {
            let c = label.index();
            class_count[c] += 1.0;
            for &(j, value) in row {
                feature_count[c][j] += value;
            }
        }

        let total = class_count[0] + class_count[1];
        let class_log_prior = [
            (class_count[0] / total).ln(),
            (class_count[1] / total).ln(),
        ];

        let feature_log_prob = feature_count.map(|counts| {
            let denominator = counts.iter().sum::<f64>() + alpha * n_features as f64;
            counts
                .iter()
                .map(|count| ((count + alpha) / denominator).ln())
                .collect::<Vec<_>>()
        });

        Self {
            class_log_prior,
            feature_log_prob,
        }
    }

    pub fn predict_proba(&self, x: &SparseVector) -> [f64; 2] {
        let mut joint = self.class_log_prior;
        for (c, log_prob) in self.feature_log_prob.iter().enumerate() {
            for &(j, value) in x {
                joint[c] += value * log_prob[j];
            }
        }
        softmax(joint)
    }
}

pub(crate) fn softmax(log_scores: [f64; 2]) -> [f64; 2] {
    let max = log_scores[0].max(log_scores[1]);
    let e0 = (log_scores[0] - max).exp();
    let e1 = (log_scores[1] - max).exp();
    let sum = e0 + e1;
    [e0 / sum, e1 / sum]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separates_two_features() {
        let x = vec![
            vec![(0, 1.0)],
            vec![(0, 0.8), (1, 0.2)],
            vec![(1, 1.0)],
            vec![(0, 0.1), (1, 0.9)],
        ];
        let y = vec![Label::Scam, Label::Scam, Label::Legitimate, Label::Legitimate];
        let model = MultinomialNb::fit(&x, &y, 2, 0.1);

        let p = model.predict_proba(&vec![(0, 1.0)]);
        assert!(p[1] > 0.5);
        assert!((p[0] + p[1] - 1.0).abs() < 1e-9);

        let p = model.predict_proba(&vec![(1, 1.0)]);
        assert!(p[0] > 0.5);
    }

    #[test]
    fn test_empty_row_falls_back_to_prior() {
        let x = vec![vec![(0, 1.0)], vec![(0, 1.0)], vec![(1, 1.0)]];
        let y = vec![Label::Scam, Label::Scam, Label::Legitimate];
        let model = MultinomialNb::fit(&x, &y, 2, 0.1);
        let p = model.predict_proba(&vec![]);
        assert!((p[1] - 2.0 / 3.0).abs() < 1e-9);
    }
}
