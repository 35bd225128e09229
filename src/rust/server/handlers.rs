//! HTTP route handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use log::{debug, error, info};

use super::dto::*;
use super::error::ApiError;
use super::state::AppState;
use crate::disease::{suggest_symptoms as rank_symptoms, ENDPOINT_SUGGESTION_LIMIT};

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".to_string() })
}

/// Symptom vocabulary in feature order.
pub async fn symptoms(State(state): State<Arc<AppState>>) -> Json<SymptomsResponse> {
    Json(SymptomsResponse {
        symptoms: state.predictor.symptoms().to_vec(),
    })
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    debug!("Predicting disease for {:?}", req.symptoms);
    let predicted_disease = state.predictor.predict(&req.symptoms).map_err(|e| {
        error!("Prediction failed: {}", e);
        ApiError::bad_request(e)
    })?;
    info!("Predicted {} from {} symptoms", predicted_disease, req.symptoms.len());
    Ok(Json(PredictResponse { predicted_disease }))
}

pub async fn suggest_symptoms(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SuggestSymptomsRequest>,
) -> Result<Json<SuggestSymptomsResponse>, ApiError> {
    let dataset = state.symptom_data.as_ref().ok_or_else(|| {
        let path = &state.sources.disease_dataset;
        error!("Symptom suggestion requested but {:?} was not loaded", path);
        ApiError::BadRequest(format!("Symptom dataset not available at {}", path.display()))
    })?;
    let suggested_symptoms = rank_symptoms(dataset, &req.selected_symptoms, ENDPOINT_SUGGESTION_LIMIT);
    debug!("Suggested {:?} for {:?}", suggested_symptoms, req.selected_symptoms);
    Ok(Json(SuggestSymptomsResponse { suggested_symptoms }))
}

pub async fn emoji_suggest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmojiSuggestRequest>,
) -> Result<Json<EmojiSuggestResponse>, ApiError> {
    req.validate().map_err(ApiError::BadRequest)?;
    let suggester = state.emoji_suggester().await.map_err(|e| {
        error!("Emoji suggestion failed: {}", e);
        ApiError::Internal(format!("Emoji suggestion failed: {}", e))
    })?;

    let suggestion = suggester
        .suggest(&req.text, req.top_n())
        .ok_or_else(|| ApiError::internal("Emoji suggestion failed: No predictions generated"))?;
    info!(
        "Suggested {} emojis ({}, {:.3})",
        suggestion.suggestions.len(),
        suggestion.emotion,
        suggestion.confidence
    );

    Ok(Json(EmojiSuggestResponse {
        success: true,
        algorithm: ALGORITHM.to_string(),
        emotion: suggestion.emotion,
        confidence: suggestion.confidence,
        suggestions: suggestion.suggestions,
        text: req.text,
        raw_predictions: suggestion.raw_predictions,
    }))
}

pub async fn emoji_train(State(state): State<Arc<AppState>>) -> Result<Json<EmojiTrainResponse>, ApiError> {
    info!("Emoji training requested");
    let (report, suggester) = state.train_emoji().await.map_err(|e| {
        error!("Emoji training failed: {}", e);
        ApiError::internal(e)
    })?;
    Ok(Json(EmojiTrainResponse {
        status: "success".to_string(),
        algorithm: ALGORITHM.to_string(),
        accuracy: report.accuracy,
        num_emojis: suggester.num_emojis(),
        message: format!("{} emoji model trained successfully", ALGORITHM),
    }))
}
