//! Structured outcome of one successful prediction.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::PredictResponse;
use crate::error::SessionError;

/// One entry of the ranked alternatives list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPrediction {
    pub display_name: String,
    /// Percentage as received from the API; never clamped.
    pub confidence_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub display_name: String,
    pub confidence_percent: f64,
    pub plant_type: String,
    pub is_healthy: bool,
    pub advice: String,
    /// In the order the server ranked them. Never empty.
    pub top_predictions: Vec<RankedPrediction>,
    pub analyzed_at: DateTime<Utc>,
    /// Free-text hint the server may attach (`message`).
    pub note: Option<String>,
}

impl AnalysisResult {
    /// Build a result from a predict body.
    ///
    /// A body that does not declare success, or declares it without the
    /// headline fields, is a server rejection.
    pub fn from_response(
        response: &PredictResponse,
        analyzed_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if !response.success {
            return Err(SessionError::server_rejected(response.error.as_deref()));
        }

        let (Some(display_name), Some(confidence_percent)) =
            (response.display_name.clone(), response.confidence)
        else {
            return Err(SessionError::server_rejected(None));
        };

        let mut top_predictions: Vec<RankedPrediction> = response
            .top_predictions
            .iter()
            .map(|p| RankedPrediction {
                display_name: p.display_name.clone(),
                confidence_percent: p.confidence,
            })
            .collect();
        if top_predictions.is_empty() {
            top_predictions.push(RankedPrediction {
                display_name: display_name.clone(),
                confidence_percent,
            });
        }

        Ok(Self {
            display_name,
            confidence_percent,
            plant_type: response
                .plant_type
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            is_healthy: response.is_healthy.unwrap_or(false),
            advice: response.advice.clone().unwrap_or_default(),
            top_predictions,
            analyzed_at,
            note: response.message.clone(),
        })
    }
}
