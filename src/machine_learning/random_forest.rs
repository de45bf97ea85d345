use super::vectorizer::feature_value;
use super::{Label, SparseVector};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
enum Node {
    Leaf {
        proba: [f64; 2],
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DecisionTree {
    nodes: Vec<Node>,
}

/// Bagged gini decision trees; each split considers a random
/// `sqrt(n_features)` subset of features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(x: &[SparseVector], y: &[Label], n_features: usize, params: ForestParams) -> Self {
        let mut rng = StdRng::seed_from_u64(params.seed);
        let dense: Vec<Vec<f64>> = x
            .iter()
            .map(|row| {
                let mut values = vec![0.0; n_features];
                for &(j, v) in row {
                    values[j] = v;
                }
                values
            })
            .collect();
        let classes: Vec<usize> = y.iter().map(|label| label.index()).collect();
        let max_features = ((n_features as f64).sqrt() as usize).max(1);

        let trees = (0..params.n_estimators)
            .map(|_| {
                let sample: Vec<usize> = (0..dense.len())
                    .map(|_| rng.gen_range(0..dense.len()))
                    .collect();
                let mut builder = TreeBuilder {
                    x: &dense,
                    y: &classes,
                    n_features,
                    max_features,
                    max_depth: params.max_depth,
                    rng: &mut rng,
                    nodes: Vec::new(),
                };
                builder.build(sample, 0);
                DecisionTree {
                    nodes: builder.nodes,
                }
            })
            .collect();

        Self { trees }
    }

    pub fn predict_proba(&self, x: &SparseVector) -> [f64; 2] {
        if self.trees.is_empty() {
            return [0.5, 0.5];
        }
        let mut sum = [0.0; 2];
        for tree in &self.trees {
            let p = tree.predict_proba(x);
            sum[0] += p[0];
            sum[1] += p[1];
        }
        let n = self.trees.len() as f64;
        [sum[0] / n, sum[1] / n]
    }
}

impl DecisionTree {
    fn predict_proba(&self, x: &SparseVector) -> [f64; 2] {
        let mut current = 0;
        loop {
            match &self.nodes[current] {
                Node::Leaf { proba } => return *proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    current = if feature_value(x, *feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    n_features: usize,
    max_features: usize,
    max_depth: usize,
    rng: &'a mut StdRng,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Builds the subtree for `samples` and returns its node index.
    fn build(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let counts = self.class_counts(&samples);
        let id = self.nodes.len();
        let total = samples.len() as f64;
        self.nodes.push(Node::Leaf {
            proba: [counts[0] / total, counts[1] / total],
        });

        let pure = counts[0] == 0.0 || counts[1] == 0.0;
        if pure || depth >= self.max_depth || samples.len() < 2 {
            return id;
        }

        let Some((feature, threshold)) = self.best_split(&samples, counts) else {
            return id;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| self.x[i][feature] <= threshold);

        let left = self.build(left, depth + 1);
        let right = self.build(right, depth + 1);
        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    fn class_counts(&self, samples: &[usize]) -> [f64; 2] {
        let mut counts = [0.0; 2];
        for &i in samples {
            counts[self.y[i]] += 1.0;
        }
        counts
    }

    fn best_split(&mut self, samples: &[usize], counts: [f64; 2]) -> Option<(usize, f64)> {
        let total = samples.len() as f64;
        let parent = gini(counts, total);
        let mut best: Option<(usize, f64)> = None;
        let mut best_impurity = parent;

        let amount = self.max_features.min(self.n_features);
        let candidates = index::sample(&mut *self.rng, self.n_features, amount);
        for feature in candidates.into_iter() {
            let mut ordered: Vec<(f64, usize)> =
                samples.iter().map(|&i| (self.x[i][feature], self.y[i])).collect();
            ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = [0.0; 2];
            for k in 0..ordered.len() - 1 {
                left[ordered[k].1] += 1.0;
                if ordered[k].0 == ordered[k + 1].0 {
                    continue;
                }
                let n_left = (k + 1) as f64;
                let n_right = total - n_left;
                let right = [counts[0] - left[0], counts[1] - left[1]];
                let impurity =
                    (n_left * gini(left, n_left) + n_right * gini(right, n_right)) / total;
                if impurity < best_impurity - 1e-12 {
                    best_impurity = impurity;
                    best = Some((feature, (ordered[k].0 + ordered[k + 1].0) / 2.0));
                }
            }
        }

        best
    }
}

fn gini(counts: [f64; 2], total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    let p0 = counts[0] / total;
    let p1 = counts[1] / total;
    1.0 - p0 * p0 - p1 * p1
}
