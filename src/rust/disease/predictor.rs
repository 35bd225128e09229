use std::collections::HashMap;

use log::info;
use ndarray::Array1;

use super::builder::DiseasePredictorBuilder;
use super::encoder::LabelEncoder;
use super::forest::RandomForest;
use super::{ENCODER_FILE, MODEL_FILE, SYMPTOMS_FILE};
use crate::error::PredictionError;
use crate::model_manager::{ModelError, ModelKind, ModelManager};

/// Symptom set in, disease name out.
///
/// Holds the symptom vocabulary in training order, the label mapping and the
/// fitted forest. Read-only after construction, so it can be shared behind an
/// `Arc` across request handlers.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use amygdala::{DiseasePredictor, ModelManager};
///
/// let manager = ModelManager::new_default()?;
/// let predictor = DiseasePredictor::load(&manager)?;
/// let disease = predictor.predict(&["itching", "skin_rash"])?;
/// println!("Predicted disease: {}", disease);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DiseasePredictor {
    symptoms: Vec<String>,
    index: HashMap<String, usize>,
    encoder: LabelEncoder,
    forest: RandomForest,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<DiseasePredictor>();
    }
};

impl DiseasePredictor {
    /// Creates a new DiseasePredictorBuilder for training from a dataset
    pub fn builder<'a>() -> DiseasePredictorBuilder<'a> {
        DiseasePredictorBuilder::new()
    }

    /// Assembles a predictor from trained parts, checking they agree on shape.
    pub fn new(symptoms: Vec<String>, encoder: LabelEncoder, forest: RandomForest) -> Result<Self, ModelError> {
        if forest.n_features() != symptoms.len() {
            return Err(ModelError::Training(format!(
                "forest expects {} features but the vocabulary has {} symptoms",
                forest.n_features(),
                symptoms.len()
            )));
        }
        if forest.n_classes() != encoder.len() {
            return Err(ModelError::Training(format!(
                "forest predicts {} classes but the label mapping has {}",
                forest.n_classes(),
                encoder.len()
            )));
        }
        let index = symptoms
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        Ok(Self {
            symptoms,
            index,
            encoder,
            forest,
        })
    }

    /// Loads a previously trained predictor and checks the vocabulary against
    /// the fingerprint recorded at training time.
    pub fn load(manager: &ModelManager) -> Result<Self, ModelError> {
        let kind = ModelKind::Disease;
        let symptoms: Vec<String> = manager.read_json(kind, SYMPTOMS_FILE)?;
        manager.check_fingerprint(kind, &symptoms)?;
        let encoder: LabelEncoder = manager.read_artifact(kind, ENCODER_FILE)?;
        let forest: RandomForest = manager.read_artifact(kind, MODEL_FILE)?;
        info!(
            "Loaded disease model: {} symptoms, {} diseases, {} trees",
            symptoms.len(),
            encoder.len(),
            forest.trees().len()
        );
        Self::new(symptoms, encoder, forest)
    }

    /// Persists model, label mapping, vocabulary and manifest.
    pub fn save(&self, manager: &ModelManager) -> Result<(), ModelError> {
        let kind = ModelKind::Disease;
        manager.write_artifact(kind, MODEL_FILE, &self.forest)?;
        manager.write_artifact(kind, ENCODER_FILE, &self.encoder)?;
        manager.write_json(kind, SYMPTOMS_FILE, &self.symptoms)?;
        manager.write_manifest(kind, &self.symptoms)?;
        Ok(())
    }

    /// Known symptoms in feature order.
    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    /// Binary indicator vector over the vocabulary. Unknown names are ignored.
    pub fn encode<S: AsRef<str>>(&self, symptoms: &[S]) -> Array1<f32> {
        let mut vector = Array1::<f32>::zeros(self.symptoms.len());
        for name in symptoms {
            if let Some(&i) = self.index.get(name.as_ref()) {
                vector[i] = 1.0;
            }
        }
        vector
    }

    /// Predicts the most likely disease for a set of symptom names.
    pub fn predict<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<String, PredictionError> {
        let vector = self.encode(symptoms);
        let class = self.forest.predict(vector.view())?;
        Ok(self.encoder.decode(class)?.to_string())
    }

    /// Every disease with its probability, most likely first.
    pub fn predict_proba<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<Vec<(String, f32)>, PredictionError> {
        let vector = self.encode(symptoms);
        let proba = self.forest.predict_proba(vector.view())?;
        let mut ranked: Vec<(String, f32)> = self
            .encoder
            .classes()
            .iter()
            .cloned()
            .zip(proba.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(ranked)
    }
}
