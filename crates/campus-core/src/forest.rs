//! Random-forest regression: bagged CART trees split on variance reduction.
//!
//! Every feature is considered at every split and thresholds sit halfway
//! between neighbouring distinct values; samples with `x <= threshold` go left.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[cfg(feature = "threading")]
use rayon::prelude::*;

use crate::error::ModelError;

// ── Dataset ──────────────────────────────────────────────────────────────────

/// Row-major feature matrix with one target per row.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    n_features: usize,
    features: Vec<f64>,
    targets: Vec<f64>,
}

impl Dataset {
    pub fn new(n_features: usize) -> Self {
        Self { n_features, features: Vec::new(), targets: Vec::new() }
    }

    pub fn push(&mut self, row: &[f64], target: f64) -> Result<(), ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureMismatch { expected: self.n_features, got: row.len() });
        }
        self.features.extend_from_slice(row);
        self.targets.push(target);
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.features[i * self.n_features..(i + 1) * self.n_features]
    }

    #[inline]
    fn value(&self, i: usize, feature: usize) -> f64 {
        self.features[i * self.n_features + feature]
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }
}

// ── Tree ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self { max_depth: None, min_samples_split: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Leaf { value: f64 },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

/// A single regression tree stored as a flat node list; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Fit on the rows listed in `indices` (repeats allowed, as in a bootstrap).
    pub fn fit(data: &Dataset, indices: &[usize], params: &TreeParams) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(data, indices.to_vec(), 0, params);
        tree
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split { feature, threshold, left, right } => {
                    idx = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Check that `predict` can walk every path to a leaf. Children must come
    /// after their parent, which also rules out cycles.
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Node::Split { feature, left, right, .. } = *node {
                if feature >= n_features {
                    return Err(format!("node {idx} splits on feature {feature} of {n_features}"));
                }
                for child in [left, right] {
                    if child <= idx || child >= self.nodes.len() {
                        return Err(format!("node {idx} has child {child} out of order"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Appends the subtree for `indices` and returns its node index.
    fn grow(&mut self, data: &Dataset, mut indices: Vec<usize>, depth: usize, params: &TreeParams) -> usize {
        let n = indices.len() as f64;
        let mean = indices.iter().map(|&i| data.targets[i]).sum::<f64>() / n;

        let depth_reached = params.max_depth.is_some_and(|d| depth >= d);
        if depth_reached || indices.len() < params.min_samples_split.max(2) {
            return self.push_leaf(mean);
        }

        let Some(split) = best_split(data, &mut indices) else {
            return self.push_leaf(mean);
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| data.value(i, split.feature) <= split.threshold);

        let slot = self.push_leaf(mean);
        let left = self.grow(data, left_idx, depth + 1, params);
        let right = self.grow(data, right_idx, depth + 1, params);
        self.nodes[slot] = Node::Split { feature: split.feature, threshold: split.threshold, left, right };
        slot
    }

    fn push_leaf(&mut self, value: f64) -> usize {
        self.nodes.push(Node::Leaf { value });
        self.nodes.len() - 1
    }
}

/// Best variance-reducing split over all features, or `None` when no split
/// improves on the parent (constant targets or constant features).
fn best_split(data: &Dataset, indices: &mut [usize]) -> Option<SplitCandidate> {
    let n = indices.len();
    let total: f64 = indices.iter().map(|&i| data.targets[i]).sum();
    // Minimising child SSE is maximising Σ(sum²/count) over the two children.
    let parent_score = total * total / n as f64;
    let mut best: Option<SplitCandidate> = None;

    for feature in 0..data.n_features {
        indices.sort_by(|&a, &b| data.value(a, feature).total_cmp(&data.value(b, feature)));

        let mut left_sum = 0.0;
        for pos in 0..n - 1 {
            left_sum += data.targets[indices[pos]];
            let here = data.value(indices[pos], feature);
            let next = data.value(indices[pos + 1], feature);
            if here == next {
                continue;
            }

            let n_left = (pos + 1) as f64;
            let n_right = (n - pos - 1) as f64;
            let right_sum = total - left_sum;
            let score = left_sum * left_sum / n_left + right_sum * right_sum / n_right;

            if best.as_ref().map_or(true, |b| score > b.score) {
                // Adjacent floats can round the midpoint up onto `next`.
                let mut threshold = here + (next - here) / 2.0;
                if threshold >= next {
                    threshold = here;
                }
                best = Some(SplitCandidate { feature, threshold, score });
            }
        }
    }

    let tolerance = 1e-12 * parent_score.abs().max(1.0);
    best.filter(|b| b.score > parent_score + tolerance)
}

// ── Forest ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
    pub tree: TreeParams,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self { n_trees: 100, seed: 42, tree: TreeParams::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn fit(data: &Dataset, params: &ForestParams) -> Result<Self, ModelError> {
        if data.is_empty() || params.n_trees == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }

        // Seeds are fixed before any tree is fitted.
        let mut rng = StdRng::seed_from_u64(params.seed);
        let seeds: Vec<u64> = (0..params.n_trees).map(|_| rng.gen()).collect();

        let fit_one = |seed: &u64| {
            let mut tree_rng = StdRng::seed_from_u64(*seed);
            let n = data.len();
            let sample: Vec<usize> = (0..n).map(|_| tree_rng.gen_range(0..n)).collect();
            RegressionTree::fit(data, &sample, &params.tree)
        };

        #[cfg(feature = "threading")]
        let trees: Vec<RegressionTree> = seeds.par_iter().map(fit_one).collect();
        #[cfg(not(feature = "threading"))]
        let trees: Vec<RegressionTree> = seeds.iter().map(fit_one).collect();

        Ok(Self { n_features: data.n_features(), trees })
    }

    pub fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureMismatch { expected: self.n_features, got: row.len() });
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        Ok(sum / self.trees.len() as f64)
    }

    /// Structural check for forests that were deserialized rather than fitted.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidModel { reason: "forest has no trees".to_string() });
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|reason| ModelError::InvalidModel { reason: format!("tree {i}: {reason}") })?;
        }
        Ok(())
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}
