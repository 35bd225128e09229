use log::info;
use ndarray::Array2;

use super::dataset::SymptomDataset;
use super::encoder::LabelEncoder;
use super::forest::{ForestConfig, RandomForest};
use super::predictor::DiseasePredictor;
use crate::model_manager::{ModelError, ModelKind, TrainingReport};
use crate::split::{accuracy, stratified_split, DEFAULT_TEST_SIZE};

/// A builder for training a [`DiseasePredictor`] with a fluent interface.
#[derive(Debug, Default)]
pub struct DiseasePredictorBuilder<'a> {
    dataset: Option<&'a SymptomDataset>,
    forest_config: ForestConfig,
    test_size: Option<f64>,
}

impl<'a> DiseasePredictorBuilder<'a> {
    /// Creates a new empty builder with the default forest configuration
    pub fn new() -> Self {
        Self {
            dataset: None,
            forest_config: ForestConfig::default(),
            test_size: None,
        }
    }

    /// Sets the dataset to train on
    pub fn with_dataset(mut self, dataset: &'a SymptomDataset) -> Self {
        self.dataset = Some(dataset);
        self
    }

    /// Sets the forest hyperparameters
    ///
    /// # Example
    /// ```
    /// use amygdala::{DiseasePredictor, ForestConfig};
    ///
    /// let builder = DiseasePredictor::builder()
    ///     .with_forest_config(ForestConfig { n_trees: 50, ..ForestConfig::default() });
    /// ```
    pub fn with_forest_config(mut self, config: ForestConfig) -> Self {
        self.forest_config = config;
        self
    }

    /// Fraction of rows held out for the accuracy estimate (default 0.2).
    /// With 0 every row is used for training and accuracy is reported on the training rows.
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = Some(test_size);
        self
    }

    /// Trains the predictor and reports holdout accuracy.
    ///
    /// # Returns
    /// * `Result<(DiseasePredictor, TrainingReport), ModelError>` - or an error if:
    ///   - No dataset was set
    ///   - The dataset has no rows or no symptom columns
    ///   - The forest failed to fit
    pub fn build(self) -> Result<(DiseasePredictor, TrainingReport), ModelError> {
        let dataset = self
            .dataset
            .ok_or_else(|| ModelError::Training("A dataset must be set".to_string()))?;
        if dataset.is_empty() || dataset.symptoms().is_empty() {
            return Err(ModelError::Training("Dataset has no rows or no symptom columns".to_string()));
        }

        let (encoder, y) = LabelEncoder::fit_transform(dataset.labels());
        let x: Array2<f32> = dataset.features().mapv(f32::from);

        let test_size = self.test_size.unwrap_or(DEFAULT_TEST_SIZE);
        let split = stratified_split(&y, test_size, self.forest_config.seed);
        info!(
            "Training on {} rows, holding out {} ({} symptoms, {} diseases)",
            split.train.len(),
            split.test.len(),
            dataset.symptoms().len(),
            encoder.len()
        );

        let x_train = x.select(ndarray::Axis(0), &split.train);
        let y_train: Vec<usize> = split.train.iter().map(|&i| y[i]).collect();

        info!("Fitting random forest with {} trees...", self.forest_config.n_trees);
        let forest = RandomForest::fit(x_train.view(), &y_train, encoder.len(), &self.forest_config)?;

        // Without a holdout, report fit on the training rows
        let eval_rows = if split.test.is_empty() { &split.train } else { &split.test };
        let expected: Vec<usize> = eval_rows.iter().map(|&i| y[i]).collect();
        let predicted = eval_rows
            .iter()
            .map(|&i| forest.predict(x.row(i)))
            .collect::<Result<Vec<usize>, _>>()
            .map_err(|e| ModelError::Training(e.to_string()))?;
        let accuracy = accuracy(&expected, &predicted);
        info!("Holdout accuracy: {:.4}", accuracy);

        let report = TrainingReport {
            kind: ModelKind::Disease,
            accuracy,
            num_classes: encoder.len(),
            num_features: dataset.symptoms().len(),
            train_rows: split.train.len(),
            test_rows: split.test.len(),
        };
        let predictor = DiseasePredictor::new(dataset.symptoms().to_vec(), encoder, forest)?;
        Ok((predictor, report))
    }
}
