use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::catalog::{detect_emotion, emoji_name, expand_emotion};
use super::dataset::EmojiCorpus;
use super::naive_bayes::{MultinomialNb, DEFAULT_ALPHA};
use super::text::preprocess_text;
use super::vectorizer::{SparseRow, TfidfVectorizer, VectorizerConfig};
use super::{LABEL_MAPPING_FILE, MODEL_FILE, VECTORIZER_FILE};
use crate::model_manager::{ModelError, ModelKind, ModelManager, TrainingReport};
use crate::split::{accuracy, stratified_split, DEFAULT_SEED, DEFAULT_TEST_SIZE};

/// Rendered for class labels missing from the label → emoji mapping.
pub const UNKNOWN_EMOJI: &str = "❓";

/// Number of ranked classes returned when the caller does not ask for a count.
pub const DEFAULT_TOP_N: usize = 5;

/// Hyperparameters of an emoji training run.
#[derive(Debug, Clone, PartialEq)]
pub struct EmojiTrainingConfig {
    pub vectorizer: VectorizerConfig,
    /// Naive Bayes additive smoothing
    pub alpha: f64,
    pub test_size: f64,
    pub seed: u64,
}

impl Default for EmojiTrainingConfig {
    fn default() -> Self {
        Self {
            vectorizer: VectorizerConfig::default(),
            alpha: DEFAULT_ALPHA,
            test_size: DEFAULT_TEST_SIZE,
            seed: DEFAULT_SEED,
        }
    }
}

/// One ranked emoji class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiPrediction {
    pub emoji: String,
    pub probability: f64,
    /// Same value as `probability`
    pub confidence: f64,
    pub label: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedEmoji {
    pub emoji: String,
    pub description: String,
    pub emotion: String,
}

/// Emojis sharing the emotion of the most probable class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiSuggestion {
    pub emotion: String,
    /// Probability of the top class
    pub confidence: f64,
    pub suggestions: Vec<SuggestedEmoji>,
    pub raw_predictions: Vec<EmojiPrediction>,
}

/// Text in, emojis out: TF-IDF features scored by multinomial Naive Bayes.
#[derive(Debug, Clone)]
pub struct EmojiSuggester {
    model: MultinomialNb,
    vectorizer: TfidfVectorizer,
    emoji_map: BTreeMap<u32, String>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<EmojiSuggester>();
    }
};

impl EmojiSuggester {
    pub fn builder<'a>() -> EmojiSuggesterBuilder<'a> {
        EmojiSuggesterBuilder::new()
    }

    pub fn new(model: MultinomialNb, vectorizer: TfidfVectorizer, emoji_map: BTreeMap<u32, String>) -> Self {
        Self {
            model,
            vectorizer,
            emoji_map,
        }
    }

    /// Loads a trained suggester, rejecting a vocabulary that differs from the
    /// one recorded in the manifest.
    pub fn load(manager: &ModelManager) -> Result<Self, ModelError> {
        let kind = ModelKind::Emoji;
        let vectorizer: TfidfVectorizer = manager.read_artifact(kind, VECTORIZER_FILE)?;
        manager.check_fingerprint(kind, vectorizer.terms())?;
        let model: MultinomialNb = manager.read_artifact(kind, MODEL_FILE)?;
        let emoji_map: BTreeMap<u32, String> = manager.read_artifact(kind, LABEL_MAPPING_FILE)?;
        info!(
            "Loaded emoji model: {} terms, {} classes, {} mapped emojis",
            vectorizer.n_features(),
            model.classes().len(),
            emoji_map.len()
        );
        Ok(Self::new(model, vectorizer, emoji_map))
    }

    pub fn save(&self, manager: &ModelManager) -> Result<(), ModelError> {
        let kind = ModelKind::Emoji;
        manager.write_artifact(kind, MODEL_FILE, &self.model)?;
        manager.write_artifact(kind, VECTORIZER_FILE, &self.vectorizer)?;
        manager.write_artifact(kind, LABEL_MAPPING_FILE, &self.emoji_map)?;
        manager.write_manifest(kind, self.vectorizer.terms())?;
        Ok(())
    }

    /// Size of the label → emoji mapping.
    pub fn num_emojis(&self) -> usize {
        self.emoji_map.len()
    }

    pub fn emoji_for(&self, label: u32) -> &str {
        self.emoji_map
            .get(&label)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_EMOJI)
    }

    /// The `top_n` most probable emoji classes for `text`, most probable first.
    /// Text that normalizes to nothing yields no predictions.
    pub fn predict(&self, text: &str, top_n: usize) -> Vec<EmojiPrediction> {
        let text = preprocess_text(text);
        if text.is_empty() {
            return Vec::new();
        }
        let row = self.vectorizer.transform(&text);
        debug!("{} known terms in input", row.len());
        self.rank(&row, top_n)
    }

    fn rank(&self, row: &SparseRow, top_n: usize) -> Vec<EmojiPrediction> {
        let proba = self.model.predict_proba(row);
        let mut order: Vec<usize> = (0..proba.len()).collect();
        // stable, so equal probabilities keep class order
        order.sort_by(|&a, &b| proba[b].total_cmp(&proba[a]));
        order
            .into_iter()
            .take(top_n)
            .map(|i| {
                let label = self.model.classes()[i];
                EmojiPrediction {
                    emoji: self.emoji_for(label).to_string(),
                    probability: proba[i],
                    confidence: proba[i],
                    label,
                }
            })
            .collect()
    }

    /// Expands the top prediction into the emojis of its emotion group.
    pub fn suggest(&self, text: &str, top_n: usize) -> Option<EmojiSuggestion> {
        let raw_predictions = self.predict(text, top_n);
        let top = raw_predictions.first()?;
        let emotion = detect_emotion(&top.emoji);
        let suggestions = expand_emotion(&top.emoji, emotion)
            .into_iter()
            .map(|emoji| SuggestedEmoji {
                description: emoji_name(&emoji).to_string(),
                emoji,
                emotion: emotion.to_string(),
            })
            .collect();
        Some(EmojiSuggestion {
            emotion: emotion.to_string(),
            confidence: top.confidence,
            suggestions,
            raw_predictions,
        })
    }
}

/// A builder for training an [`EmojiSuggester`].
#[derive(Debug, Default)]
pub struct EmojiSuggesterBuilder<'a> {
    corpus: Option<&'a EmojiCorpus>,
    emoji_map: BTreeMap<u32, String>,
    config: EmojiTrainingConfig,
}

impl<'a> EmojiSuggesterBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_corpus(mut self, corpus: &'a EmojiCorpus) -> Self {
        self.corpus = Some(corpus);
        self
    }

    pub fn with_emoji_map(mut self, emoji_map: BTreeMap<u32, String>) -> Self {
        self.emoji_map = emoji_map;
        self
    }

    pub fn with_config(mut self, config: EmojiTrainingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_vectorizer_config(mut self, config: VectorizerConfig) -> Self {
        self.config.vectorizer = config;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.config.alpha = alpha;
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.config.test_size = test_size;
        self
    }

    /// Fits vectorizer and classifier on the training split and scores the holdout.
    pub fn build(self) -> Result<(EmojiSuggester, TrainingReport), ModelError> {
        let corpus = self
            .corpus
            .ok_or_else(|| ModelError::Training("A training corpus must be set".to_string()))?;
        if corpus.is_empty() {
            return Err(ModelError::Training("Training corpus is empty".to_string()));
        }
        let config = self.config;

        let labels: Vec<usize> = corpus.labels().iter().map(|&l| l as usize).collect();
        let split = stratified_split(&labels, config.test_size, config.seed);
        info!(
            "Training on {} texts, holding out {}",
            split.train.len(),
            split.test.len()
        );

        let train_texts: Vec<&str> = split.train.iter().map(|&i| corpus.texts()[i].as_str()).collect();
        let train_labels: Vec<u32> = split.train.iter().map(|&i| corpus.labels()[i]).collect();

        let vectorizer = TfidfVectorizer::fit(&train_texts, config.vectorizer.clone())?;
        let rows: Vec<SparseRow> = train_texts.iter().map(|t| vectorizer.transform(t)).collect();
        info!(
            "Fitting Naive Bayes (alpha {}) on {} features",
            config.alpha,
            vectorizer.n_features()
        );
        let model = MultinomialNb::fit(&rows, &train_labels, vectorizer.n_features(), config.alpha)?;

        let eval_rows = if split.test.is_empty() { &split.train } else { &split.test };
        let expected: Vec<usize> = eval_rows.iter().map(|&i| labels[i]).collect();
        let predicted: Vec<usize> = eval_rows
            .iter()
            .map(|&i| model.predict(&vectorizer.transform(&corpus.texts()[i])) as usize)
            .collect();
        let accuracy = accuracy(&expected, &predicted);
        info!("Holdout accuracy: {:.4}", accuracy);

        let report = TrainingReport {
            kind: ModelKind::Emoji,
            accuracy,
            num_classes: model.classes().len(),
            num_features: vectorizer.n_features(),
            train_rows: split.train.len(),
            test_rows: split.test.len(),
        };
        Ok((EmojiSuggester::new(model, vectorizer, self.emoji_map), report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn corpus() -> EmojiCorpus {
        let mut pairs = Vec::new();
        for _ in 0..3 {
            pairs.push(("so sad and crying today", 0));
            pairs.push(("crying alone so sad", 0));
            pairs.push(("love you so much my love", 1));
            pairs.push(("sending love to you", 1));
            pairs.push(("so angry right now", 2));
            pairs.push(("angry at this traffic", 2));
        }
        EmojiCorpus::from_pairs(&pairs)
    }

    fn mapping() -> BTreeMap<u32, String> {
        // label 2 deliberately unmapped
        BTreeMap::from([(0, "😢".to_string()), (1, "❤️".to_string())])
    }

    fn trained() -> EmojiSuggester {
        let corpus = corpus();
        let (suggester, _) = EmojiSuggester::builder()
            .with_corpus(&corpus)
            .with_emoji_map(mapping())
            .with_test_size(0.0)
            .build()
            .unwrap();
        suggester
    }

    #[test]
    fn test_predict_ranks_and_maps() {
        let suggester = trained();
        let predictions = suggester.predict("crying and sad", 3);
        assert_eq!(predictions.len(), 3);
        assert_eq!(predictions[0].emoji, "😢");
        assert_eq!(predictions[0].label, 0);
        assert!(predictions.windows(2).all(|w| w[0].probability >= w[1].probability));
        assert!(predictions.iter().all(|p| p.confidence == p.probability));

        let angry = suggester.predict("so angry", 1);
        assert_eq!(angry[0].emoji, UNKNOWN_EMOJI);
    }

    #[test]
    fn test_empty_text_has_no_suggestions() {
        let suggester = trained();
        assert!(suggester.predict("@user #", 5).is_empty());
        assert!(suggester.suggest("@user #", 5).is_none());
    }

    #[test]
    fn test_suggest_expands_emotion() {
        let suggester = trained();
        let suggestion = suggester.suggest("sending my love", 5).unwrap();
        assert_eq!(suggestion.emotion, "love");
        assert_eq!(suggestion.suggestions.len(), 5);
        assert_eq!(suggestion.suggestions[0].emoji, "❤️");
        assert_eq!(suggestion.suggestions[0].description, "Red Heart");
        assert_eq!(suggestion.confidence, suggestion.raw_predictions[0].probability);
    }

    #[test]
    fn test_unmapped_top_emoji_is_neutral() {
        let suggester = trained();
        let suggestion = suggester.suggest("angry angry traffic", 5).unwrap();
        assert_eq!(suggestion.emotion, "neutral");
        assert_eq!(suggestion.suggestions[0].emoji, "😐");
    }

    #[test]
    fn test_report() {
        let corpus = corpus();
        let (suggester, report) = EmojiSuggester::builder()
            .with_corpus(&corpus)
            .with_emoji_map(mapping())
            .build()
            .unwrap();
        assert_eq!(report.kind, ModelKind::Emoji);
        assert_eq!(report.num_classes, 3);
        assert_eq!(report.train_rows + report.test_rows, corpus.len());
        assert_eq!(suggester.num_emojis(), 2);
    }

    #[test]
    fn test_save_and_load() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let manager = ModelManager::new(dir.path())?;
        let suggester = trained();
        suggester.save(&manager)?;
        assert!(manager.verify(ModelKind::Emoji)?);

        let loaded = EmojiSuggester::load(&manager)?;
        assert_eq!(loaded.num_emojis(), 2);
        assert_eq!(loaded.predict("so sad", 2), suggester.predict("so sad", 2));
        Ok(())
    }
}
