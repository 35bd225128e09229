//! Symptom-to-disease prediction and follow-up symptom suggestions.

mod builder;
mod dataset;
mod encoder;
mod forest;
mod predictor;
mod scorer;

pub use builder::DiseasePredictorBuilder;
pub use dataset::{SymptomDataset, LABEL_COLUMN};
pub use encoder::LabelEncoder;
pub use forest::{DecisionTree, ForestConfig, RandomForest};
pub use predictor::DiseasePredictor;
pub use scorer::{
    score_symptoms, suggest_symptoms, SymptomScore, DEFAULT_SUGGESTION_LIMIT, ENDPOINT_SUGGESTION_LIMIT,
};

/// Serialized [`RandomForest`]
pub const MODEL_FILE: &str = "model.bin";
/// Serialized [`LabelEncoder`]
pub const ENCODER_FILE: &str = "label_encoder.bin";
/// Symptom vocabulary in feature order, as a JSON array
pub const SYMPTOMS_FILE: &str = "symptoms.json";
