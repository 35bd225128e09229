use log::debug;
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::PredictionError;
use crate::model_manager::ModelError;
use crate::split::DEFAULT_SEED;

/// Impurity decreases smaller than this do not justify a split.
const MIN_IMPURITY_DECREASE: f64 = 1e-12;

/// Hyperparameters of a [`RandomForest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the ensemble
    pub n_trees: usize,
    /// Seed for bootstrap sampling and feature selection
    pub seed: u64,
    /// Candidate features per split; `None` means `sqrt(n_features)`
    pub max_features: Option<usize>,
    /// Nodes with fewer samples become leaves
    pub min_samples_split: usize,
    /// Maximum tree depth; `None` grows trees until leaves are pure
    pub max_depth: Option<usize>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 300,
            seed: DEFAULT_SEED,
            max_features: None,
            min_samples_split: 2,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        distribution: Vec<f32>,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
}

/// A CART classification tree stored as a flat node arena, root at index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn leaf_distribution(&self, row: ArrayView1<f32>) -> &[f32] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { distribution } => return distribution,
                Node::Split { feature, threshold, left, right } => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

struct Candidate {
    feature: usize,
    threshold: f32,
    impurity: f64,
}

struct TreeGrower<'a> {
    x: ArrayView2<'a, f32>,
    y: &'a [usize],
    n_classes: usize,
    max_features: usize,
    min_samples_split: usize,
    max_depth: Option<usize>,
    rng: StdRng,
    nodes: Vec<Node>,
}

impl TreeGrower<'_> {
    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &s in samples {
            counts[self.y[s]] += 1;
        }
        counts
    }

    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let counts = self.class_counts(&samples);
        let n = samples.len();
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            distribution: counts.iter().map(|&c| c as f32 / n as f32).collect(),
        });

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let too_deep = self.max_depth.is_some_and(|d| depth >= d);
        if pure || too_deep || n < self.min_samples_split {
            return id;
        }

        let Some(best) = self.best_split(&samples, &counts) else {
            return id;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&s| self.x[[s, best.feature]] <= best.threshold);
        let left = self.grow(left, depth + 1);
        let right = self.grow(right, depth + 1);
        self.nodes[id] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        id
    }

    /// Best Gini split over a random subset of features. Constant features do
    /// not count towards the subset size.
    fn best_split(&mut self, samples: &[usize], counts: &[usize]) -> Option<Candidate> {
        let n = samples.len();
        let parent = gini(counts, n);

        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        features.shuffle(&mut self.rng);

        let mut best: Option<Candidate> = None;
        let mut visited = 0;
        let mut column: Vec<(f32, usize)> = Vec::with_capacity(n);

        for feature in features {
            if visited >= self.max_features {
                break;
            }
            column.clear();
            column.extend(samples.iter().map(|&s| (self.x[[s, feature]], self.y[s])));
            column.sort_by(|a, b| a.0.total_cmp(&b.0));
            if column[0].0 == column[n - 1].0 {
                continue;
            }
            visited += 1;

            let mut left = vec![0usize; self.n_classes];
            let mut right = counts.to_vec();
            let mut left_sq: f64 = 0.0;
            let mut right_sq: f64 = counts.iter().map(|&c| (c * c) as f64).sum();

            for i in 0..n - 1 {
                let class = column[i].1;
                left_sq += (2 * left[class] + 1) as f64;
                left[class] += 1;
                right_sq -= (2 * right[class] - 1) as f64;
                right[class] -= 1;

                if column[i].0 == column[i + 1].0 {
                    continue;
                }
                let nl = (i + 1) as f64;
                let nr = (n - i - 1) as f64;
                // weighted child impurity: (nl * gini_l + nr * gini_r) / n
                let impurity = ((nl - left_sq / nl) + (nr - right_sq / nr)) / n as f64;
                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    best = Some(Candidate {
                        feature,
                        threshold: column[i].0 + (column[i + 1].0 - column[i].0) / 2.0,
                        impurity,
                    });
                }
            }
        }

        best.filter(|b| parent - b.impurity > MIN_IMPURITY_DECREASE)
    }
}

fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

/// A bagged ensemble of CART trees with random feature subsets per split.
///
/// Class probabilities are the mean of the leaf class distributions reached in
/// every tree; the predicted class is their arg-max.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

impl RandomForest {
    /// Fits a forest on rows of `x` labelled by class indices `y` in `0..n_classes`.
    ///
    /// # Errors
    /// `ModelError::Training` if the inputs are empty, inconsistent, or a label
    /// is out of range.
    pub fn fit<'a>(
        x: ArrayView2<'a, f32>,
        y: &'a [usize],
        n_classes: usize,
        config: &ForestConfig,
    ) -> Result<Self, ModelError> {
        let (n_samples, n_features) = x.dim();
        if n_samples == 0 || n_features == 0 {
            return Err(ModelError::Training("cannot fit a forest on an empty matrix".into()));
        }
        if y.len() != n_samples {
            return Err(ModelError::Training(format!(
                "{} rows but {} labels",
                n_samples,
                y.len()
            )));
        }
        if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
            return Err(ModelError::Training(format!(
                "label {} out of range for {} classes",
                bad, n_classes
            )));
        }
        if config.n_trees == 0 {
            return Err(ModelError::Training("forest needs at least one tree".into()));
        }

        let max_features = config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt() as usize)
            .clamp(1, n_features);

        let mut master = StdRng::seed_from_u64(config.seed);
        let mut trees = Vec::with_capacity(config.n_trees);
        for t in 0..config.n_trees {
            let mut rng = StdRng::seed_from_u64(master.random());
            let bootstrap: Vec<usize> = (0..n_samples).map(|_| rng.random_range(0..n_samples)).collect();
            let mut grower = TreeGrower {
                x,
                y,
                n_classes,
                max_features,
                min_samples_split: config.min_samples_split.max(2),
                max_depth: config.max_depth,
                rng,
                nodes: Vec::new(),
            };
            grower.grow(bootstrap, 0);
            debug!("Tree {}/{} grown with {} nodes", t + 1, config.n_trees, grower.nodes.len());
            trees.push(DecisionTree { nodes: grower.nodes });
        }

        Ok(Self {
            trees,
            n_features,
            n_classes,
        })
    }

    /// Mean class distribution over all trees.
    pub fn predict_proba(&self, row: ArrayView1<f32>) -> Result<Array1<f32>, PredictionError> {
        if row.len() != self.n_features {
            return Err(PredictionError::Dimension {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        let mut proba = Array1::<f32>::zeros(self.n_classes);
        for tree in &self.trees {
            for (p, &d) in proba.iter_mut().zip(tree.leaf_distribution(row)) {
                *p += d;
            }
        }
        proba /= self.trees.len() as f32;
        Ok(proba)
    }

    /// Most probable class; the lowest index wins ties.
    pub fn predict(&self, row: ArrayView1<f32>) -> Result<usize, PredictionError> {
        let proba = self.predict_proba(row)?;
        Ok(argmax(&proba))
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

fn argmax(values: &Array1<f32>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
