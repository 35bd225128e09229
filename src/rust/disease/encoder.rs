use serde::{Deserialize, Serialize};

use crate::error::PredictionError;

/// Bidirectional mapping between disease names and class indices.
///
/// Classes are the distinct training labels in lexicographic order; a label's
/// index is its position in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learns the classes of `labels` and returns the encoder with every label encoded.
    pub fn fit_transform<S: AsRef<str>>(labels: &[S]) -> (Self, Vec<usize>) {
        let mut classes: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        let encoder = Self { classes };
        let encoded = labels
            .iter()
            .map(|l| encoder.position(l.as_ref()).unwrap_or_default())
            .collect();
        (encoder, encoded)
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.classes.binary_search_by(|c| c.as_str().cmp(label)).ok()
    }

    /// Class index of a label seen during fitting.
    pub fn encode(&self, label: &str) -> Option<usize> {
        self.position(label)
    }

    /// Label of a class index.
    pub fn decode(&self, index: usize) -> Result<&str, PredictionError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(PredictionError::UnknownClass(index))
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
