use super::{Label, SparseVector};
use serde::{Deserialize, Serialize};

const LEARNING_RATE: f64 = 1.0;
const TOLERANCE: f64 = 1e-6;

/// L2-regularised binary logistic regression, fitted with full-batch
/// gradient descent. `c` is the inverse regularisation strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    intercept: f64,
}

impl LogisticRegression {
    pub fn fit(x: &[SparseVector], y: &[Label], n_features: usize, c: f64, max_iter: usize) -> Self {
        let n = x.len().max(1) as f64;
        let targets: Vec<f64> = y
            .iter()
            .map(|label| if *label == Label::Scam { 1.0 } else { 0.0 })
            .collect();

        let mut weights = vec![0.0; n_features];
        let mut intercept = 0.0;

        for iteration in 0..max_iter {
            let mut gradient: Vec<f64> = weights.iter().map(|w| w / (c * n)).collect();
            let mut intercept_gradient = 0.0;

            for (row, target) in x.iter().zip(&targets) {
                let error = (sigmoid(dot(&weights, row) + intercept) - target) / n;
                for &(j, value) in row {
                    gradient[j] += error * value;
                }
                intercept_gradient += error;
            }

            let step = gradient
                .iter()
                .map(|g| g.abs())
                .fold(intercept_gradient.abs(), f64::max);

            for (w, g) in weights.iter_mut().zip(&gradient) {
                *w -= LEARNING_RATE * g;
            }
            intercept -= LEARNING_RATE * intercept_gradient;

            if step < TOLERANCE {
                log::debug!("Logistic regression converged after {} iterations", iteration + 1);
                break;
            }
        }

        Self { weights, intercept }
    }

    pub fn predict_proba(&self, x: &SparseVector) -> [f64; 2] {
        let scam = sigmoid(dot(&self.weights, x) + self.intercept);
        [1.0 - scam, scam]
    }
}

fn dot(weights: &[f64], row: &SparseVector) -> f64 {
    row.iter().map(|&(j, value)| weights[j] * value).sum()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learns_separable_data() {
        let x = vec![
            vec![(0, 1.0)],
            vec![(0, 0.9), (2, 0.1)],
            vec![(1, 1.0)],
            vec![(1, 0.8), (2, 0.2)],
        ];
        let y = vec![Label::Scam, Label::Scam, Label::Legitimate, Label::Legitimate];
        let model = LogisticRegression::fit(&x, &y, 3, 1.0, 500);

        assert!(model.predict_proba(&vec![(0, 1.0)])[1] > 0.5);
        assert!(model.predict_proba(&vec![(1, 1.0)])[0] > 0.5);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = LogisticRegression {
            weights: vec![2.0, -3.0],
            intercept: 0.5,
        };
        let p = model.predict_proba(&vec![(0, 0.6), (1, 0.8)]);
        assert!((p[0] + p[1] - 1.0).abs() < 1e-12);
    }
}
