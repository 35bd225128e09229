//! Free text to emoji suggestions.

pub mod catalog;
mod dataset;
mod naive_bayes;
mod suggester;
mod text;
mod vectorizer;

pub use dataset::{load_emoji_mapping, read_emoji_mapping, EmojiCorpus};
pub use naive_bayes::{MultinomialNb, DEFAULT_ALPHA};
pub use suggester::{
    EmojiPrediction, EmojiSuggester, EmojiSuggesterBuilder, EmojiSuggestion, EmojiTrainingConfig, SuggestedEmoji,
    DEFAULT_TOP_N, UNKNOWN_EMOJI,
};
pub use text::{preprocess_text, tokenize};
pub use vectorizer::{SparseRow, TfidfVectorizer, VectorizerConfig};

/// Serialized [`MultinomialNb`]
pub const MODEL_FILE: &str = "model.bin";
/// Serialized [`TfidfVectorizer`]
pub const VECTORIZER_FILE: &str = "vectorizer.bin";
/// Label to emoji map
pub const LABEL_MAPPING_FILE: &str = "label_mapping.bin";
