use std::sync::Arc;

use log::{info, warn};
use tokio::sync::RwLock;

use crate::config::DataSources;
use crate::disease::{DiseasePredictor, SymptomDataset};
use crate::emoji::EmojiSuggester;
use crate::model_manager::{ModelError, ModelKind, ModelManager, TrainingReport};

/// Everything the handlers share. Built once before the listener starts.
pub struct AppState {
    pub manager: ModelManager,
    pub sources: DataSources,
    pub predictor: Arc<DiseasePredictor>,
    /// Table behind `/suggest-symptoms`; `None` when the dataset could not be read
    pub symptom_data: Option<Arc<SymptomDataset>>,
    emoji: RwLock<Option<Arc<EmojiSuggester>>>,
}

impl AppState {
    pub fn new(
        manager: ModelManager,
        sources: DataSources,
        predictor: Arc<DiseasePredictor>,
        symptom_data: Option<Arc<SymptomDataset>>,
        emoji: Option<Arc<EmojiSuggester>>,
    ) -> Self {
        Self {
            manager,
            sources,
            predictor,
            symptom_data,
            emoji: RwLock::new(emoji),
        }
    }

    /// Trains the disease model if needed and loads whatever is available.
    ///
    /// A disease model that can neither be loaded nor trained is fatal. The
    /// emoji model is optional until it is trained explicitly.
    pub async fn initialize(manager: ModelManager, sources: DataSources) -> Result<Self, ModelError> {
        if let Some(report) = manager.ensure(ModelKind::Disease, &sources).await? {
            info!("Disease model trained at startup (accuracy {:.4})", report.accuracy);
        }
        let predictor = Arc::new(DiseasePredictor::load(&manager)?);

        let symptom_data = match SymptomDataset::from_path(&sources.disease_dataset) {
            Ok(dataset) => Some(Arc::new(dataset)),
            Err(e) => {
                warn!("Symptom suggestions unavailable: {}", e);
                None
            }
        };

        let emoji = match EmojiSuggester::load(&manager) {
            Ok(suggester) => Some(Arc::new(suggester)),
            Err(ModelError::NotTrained { .. }) => {
                info!("Emoji model not trained yet; POST /emoji-train to train it");
                None
            }
            Err(e) => {
                warn!("Could not load emoji model: {}", e);
                None
            }
        };

        Ok(Self::new(manager, sources, predictor, symptom_data, emoji))
    }

    /// The current emoji suggester, or why there is none.
    pub async fn emoji_suggester(&self) -> Result<Arc<EmojiSuggester>, ModelError> {
        match self.emoji.read().await.as_ref() {
            Some(suggester) => Ok(Arc::clone(suggester)),
            None => Err(ModelError::NotTrained {
                kind: ModelKind::Emoji,
                path: self.manager.artifact_dir(ModelKind::Emoji),
            }),
        }
    }

    /// Retrains the emoji pipeline and swaps the new suggester in.
    pub async fn train_emoji(&self) -> Result<(TrainingReport, Arc<EmojiSuggester>), ModelError> {
        let (report, suggester) = self
            .manager
            .train_and_load(ModelKind::Emoji, &self.sources, EmojiSuggester::load)
            .await?;
        let suggester = Arc::new(suggester);
        *self.emoji.write().await = Some(Arc::clone(&suggester));
        info!("Emoji model reloaded ({} emojis)", suggester.num_emojis());
        Ok((report, suggester))
    }
}
