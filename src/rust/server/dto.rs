use serde::{Deserialize, Serialize};

use crate::emoji::{EmojiPrediction, SuggestedEmoji, DEFAULT_TOP_N};

pub const ALGORITHM: &str = "Naive Bayes";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SymptomsResponse {
    pub symptoms: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    pub symptoms: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predicted_disease: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestSymptomsRequest {
    pub selected_symptoms: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestSymptomsResponse {
    pub suggested_symptoms: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmojiSuggestRequest {
    pub text: String,
    /// Missing or `null` means [`DEFAULT_TOP_N`]
    #[serde(default)]
    pub top_n: Option<usize>,
}

impl EmojiSuggestRequest {
    pub fn top_n(&self) -> usize {
        self.top_n.unwrap_or(DEFAULT_TOP_N)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.top_n() == 0 {
            return Err("top_n must be at least 1".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmojiSuggestResponse {
    pub success: bool,
    pub algorithm: String,
    pub emotion: String,
    pub confidence: f64,
    pub suggestions: Vec<SuggestedEmoji>,
    pub text: String,
    pub raw_predictions: Vec<EmojiPrediction>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmojiTrainResponse {
    pub status: String,
    pub algorithm: String,
    pub accuracy: f64,
    pub num_emojis: usize,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_n_defaults() {
        let req: EmojiSuggestRequest = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(req.top_n(), 5);
        assert!(req.validate().is_ok());

        let req: EmojiSuggestRequest = serde_json::from_str(r#"{"text": "hi", "top_n": null}"#).unwrap();
        assert_eq!(req.top_n(), 5);
        assert!(req.validate().is_ok());

        let req: EmojiSuggestRequest = serde_json::from_str(r#"{"text": "hi", "top_n": 0}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
