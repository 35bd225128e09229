use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::model_manager::ModelError;

/// Errors raised while reading a training dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Dataset not found: {0}")]
    NotFound(PathBuf),
    #[error("Dataset must contain '{0}' column")]
    MissingColumn(String),
    #[error("Dataset has no usable rows: {0}")]
    Empty(String),
    #[error("Invalid label '{value}' on row {row}")]
    InvalidLabel { row: usize, value: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Represents the different types of errors that can occur while serving a prediction.
#[derive(Debug)]
pub enum PredictionError {
    /// Error occurred due to invalid input parameters
    Validation(String),
    /// The model is missing, unreadable or failed to train
    Model(ModelError),
    /// Input vector width does not match the width the model was trained with
    Dimension { expected: usize, actual: usize },
    /// The classifier produced a class index with no label
    UnknownClass(usize),
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Validation error: {}", msg),
            Self::Model(err) => write!(f, "{}", err),
            Self::Dimension { expected, actual } => write!(
                f,
                "Feature vector has {} entries but the model expects {}",
                actual, expected
            ),
            Self::UnknownClass(index) => write!(f, "y contains previously unseen label index {}", index),
        }
    }
}

impl std::error::Error for PredictionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for PredictionError {
    fn from(err: ModelError) -> Self {
        PredictionError::Model(err)
    }
}

impl From<DatasetError> for PredictionError {
    fn from(err: DatasetError) -> Self {
        PredictionError::Model(ModelError::Dataset(err))
    }
}
