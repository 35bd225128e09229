use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::vectorizer::SparseRow;
use crate::model_manager::ModelError;

/// Additive smoothing used when none is given.
pub const DEFAULT_ALPHA: f64 = 0.1;

/// Multinomial Naive Bayes over non-negative sparse features.
///
/// `P(class | x) ∝ P(class) · Π P(feature | class)^x`, with feature
/// likelihoods smoothed by `alpha`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    /// Class labels in ascending order; position is the class index
    classes: Vec<u32>,
    class_log_prior: Array1<f64>,
    /// `classes × features`
    feature_log_prob: Array2<f64>,
}

impl MultinomialNb {
    /// Fits the model on rows with `n_features` columns labelled by `y`.
    pub fn fit(rows: &[SparseRow], y: &[u32], n_features: usize, alpha: f64) -> Result<Self, ModelError> {
        if rows.is_empty() || rows.len() != y.len() {
            return Err(ModelError::Training(format!(
                "{} rows but {} labels",
                rows.len(),
                y.len()
            )));
        }
        if alpha <= 0.0 || !alpha.is_finite() {
            return Err(ModelError::Training(format!("alpha must be positive, got {}", alpha)));
        }

        let mut classes: Vec<u32> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let mut feature_count = Array2::<f64>::zeros((classes.len(), n_features));
        let mut class_count = Array1::<f64>::zeros(classes.len());
        for (row, label) in rows.iter().zip(y) {
            let c = classes
                .binary_search(label)
                .map_err(|_| ModelError::Training(format!("unknown label {}", label)))?;
            class_count[c] += 1.0;
            for &(j, value) in row {
                if j >= n_features {
                    return Err(ModelError::Training(format!(
                        "feature index {} out of range for {} features",
                        j, n_features
                    )));
                }
                feature_count[[c, j]] += value;
            }
        }

        let smoothed = feature_count.mapv(|v| v + alpha);
        let totals = smoothed.sum_axis(ndarray::Axis(1)).mapv(f64::ln);
        let mut feature_log_prob = smoothed.mapv(f64::ln);
        for (mut class_row, total) in feature_log_prob.rows_mut().into_iter().zip(totals.iter()) {
            class_row -= *total;
        }

        let n = rows.len() as f64;
        let class_log_prior = class_count.mapv(|c| (c / n).ln());

        Ok(Self {
            alpha,
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    /// Unnormalized log posterior of every class.
    pub fn joint_log_likelihood(&self, row: &SparseRow) -> Array1<f64> {
        let mut jll = self.class_log_prior.clone();
        for &(j, value) in row {
            if j < self.feature_log_prob.ncols() {
                jll.scaled_add(value, &self.feature_log_prob.column(j));
            }
        }
        jll
    }

    /// Posterior probability of every class, aligned with [`MultinomialNb::classes`].
    pub fn predict_proba(&self, row: &SparseRow) -> Array1<f64> {
        let jll = self.joint_log_likelihood(row);
        let max = jll.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        let exp = jll.mapv(|v| (v - max).exp());
        let total = exp.sum();
        exp / total
    }

    /// Most probable class label; the lowest label wins ties.
    pub fn predict(&self, row: &SparseRow) -> u32 {
        let jll = self.joint_log_likelihood(row);
        let mut best = 0;
        for (i, &v) in jll.iter().enumerate() {
            if v > jll[best] {
                best = i;
            }
        }
        self.classes[best]
    }

    pub fn classes(&self) -> &[u32] {
        &self.classes
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}
