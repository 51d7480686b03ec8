//! Wire types for the classification API's JSON responses.
//!
//! Parsing is lenient: the server adds fields freely (`prediction`,
//! `class_index`, per-prediction `plant`/`disease`, ...) and the client only
//! reads what it renders.

use serde::{Deserialize, Serialize};

/// Body of `GET /health`. Any 2xx counts as healthy; these fields are extras.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model_loaded: Option<bool>,
    #[serde(default)]
    pub classes_loaded: Option<u32>,
}

/// One disease or healthy category the remote model can report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectableClass {
    /// Raw class id, e.g. `Tomato_Early_blight`.
    #[serde(default)]
    pub id: Option<String>,
    /// Server-formatted display name, e.g. `Tomato - Early blight`.
    #[serde(default)]
    pub display: Option<String>,
    pub plant: String,
    #[serde(rename = "type", default)]
    pub class_type: String,
    #[serde(default)]
    pub disease: String,
    pub is_healthy: bool,
}

/// Body of `GET /classes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassesResponse {
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub classes: Vec<DetectableClass>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One ranked alternative from `top_predictions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirePrediction {
    pub display_name: String,
    pub confidence: f64,
}

/// Body of `POST /predict`, successful or not.
///
/// Failures arrive as `{success: false, error}` with a 4xx/5xx status, so every
/// field but `success` is optional here and checked when building the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub plant_type: Option<String>,
    #[serde(default)]
    pub is_healthy: Option<bool>,
    #[serde(default)]
    pub advice: Option<String>,
    #[serde(default)]
    pub top_predictions: Vec<WirePrediction>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body some endpoints return alongside a failure status.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_success_deserialize() {
        let json = r#"{
            "success": true,
            "prediction": "Tomato_Bacterial_spot",
            "display_name": "Tomato - Bacterial spot",
            "plant": "Tomato",
            "disease": "Bacterial spot",
            "plant_type": "Tomato",
            "confidence": 85.5,
            "class_index": 4,
            "is_healthy": false,
            "advice": "Remove infected leaves.",
            "message": "Analysis complete.",
            "top_predictions": [
                {"class": "Tomato_Bacterial_spot", "display_name": "Tomato - Bacterial spot", "confidence": 85.5, "is_healthy": false},
                {"class": "Tomato_Early_blight", "display_name": "Tomato - Early blight", "confidence": 12.3, "is_healthy": false}
            ]
        }"#;

        let resp: PredictResponse = serde_json::from_str(json).unwrap();
        assert!(resp.success);
        assert_eq!(resp.display_name.as_deref(), Some("Tomato - Bacterial spot"));
        assert_eq!(resp.confidence, Some(85.5));
        assert_eq!(resp.top_predictions.len(), 2);
        assert_eq!(resp.top_predictions[1].confidence, 12.3);
        assert_eq!(resp.message.as_deref(), Some("Analysis complete."));
    }

    #[test]
    fn test_predict_failure_deserialize() {
        let resp: PredictResponse =
            serde_json::from_str(r#"{"error": "No file uploaded", "success": false}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("No file uploaded"));
        assert!(resp.top_predictions.is_empty());
    }

    #[test]
    fn test_predict_missing_success_is_failure() {
        let resp: PredictResponse = serde_json::from_str(r#"{"error": "Model not loaded"}"#).unwrap();
        assert!(!resp.success);
    }

    #[test]
    fn test_classes_deserialize() {
        let json = r#"{
            "count": 2,
            "classes": [
                {"id": "Pepper__bell___Bacterial_spot", "display": "Pepper Bell - Bacterial spot",
                 "plant": "Pepper", "disease": "Bacterial spot", "type": "Bell", "is_healthy": false},
                {"plant": "Potato", "disease": "healthy", "type": "", "is_healthy": true}
            ]
        }"#;

        let resp: ClassesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.count, Some(2));
        assert_eq!(resp.classes[0].class_type, "Bell");
        assert!(resp.classes[1].is_healthy);
        assert!(resp.classes[1].id.is_none());
    }

    #[test]
    fn test_health_tolerates_unknown_shape() {
        let report: HealthReport = serde_json::from_str(r#"{"uptime": 12}"#).unwrap();
        assert_eq!(report, HealthReport::default());
    }
}
