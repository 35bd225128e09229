//! Symptom-to-disease prediction and text-to-emoji suggestion with natively
//! trained models, served over HTTP.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use amygdala::{DiseasePredictor, ForestConfig, SymptomDataset};
//!
//! let csv = "\
//! itching,skin_rash,cough,high_fever,prognosis
//! 1,1,0,0,Fungal infection
//! 1,1,0,0,Fungal infection
//! 0,0,1,1,Bronchitis
//! 0,0,1,1,Bronchitis
//! ";
//! let dataset = SymptomDataset::from_reader(csv.as_bytes())?;
//! let (predictor, report) = DiseasePredictor::builder()
//!     .with_dataset(&dataset)
//!     .with_forest_config(ForestConfig { n_trees: 20, ..ForestConfig::default() })
//!     .with_test_size(0.0)
//!     .build()?;
//!
//! let disease = predictor.predict(&["cough", "high_fever"])?;
//! println!("Predicted disease: {} (accuracy {:.2})", disease, report.accuracy);
//!
//! // Follow-up questions to ask the patient
//! let follow_up = dataset.suggest(&["cough"], 10);
//! assert_eq!(follow_up, vec!["high_fever"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! Trained predictors are read-only and can be shared across threads using `Arc`.
//! The HTTP server keeps them in an [`AppState`] built once at startup.

pub mod config;
pub mod disease;
pub mod emoji;
pub mod error;
pub mod model_manager;
pub mod server;
pub mod split;

pub use config::{DataSources, ServiceConfig};
pub use disease::{DiseasePredictor, DiseasePredictorBuilder, ForestConfig, SymptomDataset};
pub use emoji::{EmojiCorpus, EmojiSuggester, EmojiSuggesterBuilder, EmojiSuggestion, EmojiTrainingConfig};
pub use error::{DatasetError, PredictionError};
pub use model_manager::{ModelError, ModelKind, ModelManager, TrainingReport};
pub use server::{router, ApiError, AppState};

pub fn init_logger() {
    env_logger::init();
}
