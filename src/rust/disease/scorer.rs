use std::collections::HashSet;

use super::dataset::SymptomDataset;

/// Number of suggestions returned when the caller does not ask for a limit.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Number of suggestions the HTTP endpoint returns.
pub const ENDPOINT_SUGGESTION_LIMIT: usize = 15;

/// Upper bound of the prevalence term of the score.
const MAX_FREQUENCY_BOOST: f64 = 0.5;

/// A candidate symptom and its relevance to the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SymptomScore {
    pub symptom: String,
    /// Fraction of matching rows that also show this symptom
    pub co_occurrence: f64,
    /// `min(2 * prevalence, 0.5)` over the whole dataset
    pub frequency_boost: f64,
    pub score: f64,
}

/// Scores every unselected symptom against the rows that contain at least one
/// selected symptom, best first.
///
/// Names that are not dataset columns are ignored. Symptoms that never appear
/// in a matching row are not candidates. Equal scores keep column order.
pub fn score_symptoms<S: AsRef<str>>(dataset: &SymptomDataset, selected: &[S]) -> Vec<SymptomScore> {
    let selected_cols: HashSet<usize> = selected
        .iter()
        .filter_map(|s| dataset.column(s.as_ref()))
        .collect();
    if selected_cols.is_empty() || dataset.is_empty() {
        return Vec::new();
    }

    let n_symptoms = dataset.symptoms().len();
    let mut co_counts = vec![0usize; n_symptoms];
    let mut totals = vec![0usize; n_symptoms];
    let mut matching_rows = 0usize;

    for row in 0..dataset.len() {
        let values = dataset.row(row);
        let matches = selected_cols.iter().any(|&c| values[c] == 1);
        for (col, &v) in values.iter().enumerate() {
            if v == 1 {
                totals[col] += 1;
                if matches {
                    co_counts[col] += 1;
                }
            }
        }
        if matches {
            matching_rows += 1;
        }
    }

    if matching_rows == 0 {
        return Vec::new();
    }

    let n_rows = dataset.len() as f64;
    let mut scores: Vec<SymptomScore> = dataset
        .symptoms()
        .iter()
        .enumerate()
        .filter(|(col, _)| !selected_cols.contains(col) && co_counts[*col] > 0)
        .map(|(col, name)| {
            let co_occurrence = co_counts[col] as f64 / matching_rows as f64;
            let frequency_boost = (totals[col] as f64 / n_rows * 2.0).min(MAX_FREQUENCY_BOOST);
            SymptomScore {
                symptom: name.clone(),
                co_occurrence,
                frequency_boost,
                score: co_occurrence + frequency_boost,
            }
        })
        .collect();

    // stable: ties stay in column order
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

/// Names of the `limit` most relevant symptoms to ask about next.
pub fn suggest_symptoms<S: AsRef<str>>(dataset: &SymptomDataset, selected: &[S], limit: usize) -> Vec<String> {
    score_symptoms(dataset, selected)
        .into_iter()
        .take(limit)
        .map(|s| s.symptom)
        .collect()
}

impl SymptomDataset {
    /// See [`suggest_symptoms`].
    pub fn suggest<S: AsRef<str>>(&self, selected: &[S], limit: usize) -> Vec<String> {
        suggest_symptoms(self, selected, limit)
    }
}
