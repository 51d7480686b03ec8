//! Display view-models. Pure functions from session data to the strings the
//! presenter shows; no layout or styling decisions live here.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::api::DetectableClass;
use crate::result::AnalysisResult;
use crate::upload::ImageFile;
use crate::workflow::{ApiStatus, DisconnectReason};

/// Percentage exactly as received: `85.5 -> "85.5%"`, `100.0 -> "100%"`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", value)
}

pub fn health_label(is_healthy: bool) -> &'static str {
    if is_healthy {
        "Healthy"
    } else {
        "Diseased"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceBand {
    High,
    Moderate,
    Low,
}

impl ConfidenceBand {
    pub fn from_percent(value: f64) -> Self {
        if value >= 80.0 {
            ConfidenceBand::High
        } else if value >= 60.0 {
            ConfidenceBand::Moderate
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "confidence-high",
            ConfidenceBand::Moderate => "confidence-moderate",
            ConfidenceBand::Low => "confidence-low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRow {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub name: String,
    pub percent_text: String,
    /// CSS width for the confidence bar.
    pub bar_width: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub disease_name: String,
    pub confidence_text: String,
    pub band: ConfidenceBand,
    pub plant_text: String,
    pub status_text: String,
    pub time_text: String,
    pub advice: String,
    pub is_healthy: bool,
    pub note: Option<String>,
    pub predictions: Vec<PredictionRow>,
}

impl ResultView {
    /// Timestamps are shown in the viewer's local time.
    pub fn new(result: &AnalysisResult) -> Self {
        Self::with_time(result, |at| at.with_timezone(&Local).format("%H:%M:%S").to_string())
    }

    /// Same as [`ResultView::new`] with a caller-supplied clock rendering.
    pub fn with_time<F>(result: &AnalysisResult, render_time: F) -> Self
    where
        F: Fn(DateTime<Utc>) -> String,
    {
        let predictions = result
            .top_predictions
            .iter()
            .enumerate()
            .map(|(i, p)| PredictionRow {
                rank: i + 1,
                name: p.display_name.clone(),
                percent_text: format_percent(p.confidence_percent),
                bar_width: format_percent(p.confidence_percent),
            })
            .collect();

        Self {
            disease_name: result.display_name.clone(),
            confidence_text: format_percent(result.confidence_percent),
            band: ConfidenceBand::from_percent(result.confidence_percent),
            plant_text: format!("Plant: {}", result.plant_type),
            status_text: format!("Status: {}", health_label(result.is_healthy)),
            time_text: format!("Time: {}", render_time(result.analyzed_at)),
            advice: result.advice.clone(),
            is_healthy: result.is_healthy,
            note: result.note.clone(),
            predictions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlantIcon {
    Pepper,
    Potato,
    Tomato,
    Leaf,
}

impl PlantIcon {
    /// Later matches win, so "Tomato" beats "Potato" for a name holding both.
    pub fn for_plant(plant: &str) -> Self {
        let mut icon = PlantIcon::Leaf;
        if plant.contains("Pepper") {
            icon = PlantIcon::Pepper;
        }
        if plant.contains("Potato") {
            icon = PlantIcon::Potato;
        }
        if plant.contains("Tomato") {
            icon = PlantIcon::Tomato;
        }
        icon
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            PlantIcon::Pepper => "\u{1F336}",
            PlantIcon::Potato => "\u{1F954}",
            PlantIcon::Tomato => "\u{1F345}",
            PlantIcon::Leaf => "\u{1F343}",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassCard {
    pub title: String,
    pub disease_text: String,
    pub status_text: &'static str,
    pub badge: &'static str,
    pub is_healthy: bool,
    pub icon: PlantIcon,
}

impl ClassCard {
    pub fn new(class: &DetectableClass) -> Self {
        Self {
            title: format!("{} {}", class.plant, class.class_type).trim().to_string(),
            disease_text: format!("Disease: {}", class.disease),
            status_text: if class.is_healthy { "Healthy Plant" } else { "Diseased" },
            badge: if class.is_healthy { "HEALTHY" } else { "DISEASED" },
            is_healthy: class.is_healthy,
            icon: PlantIcon::for_plant(&class.plant),
        }
    }
}

pub fn class_cards(classes: &[DetectableClass]) -> Vec<ClassCard> {
    classes.iter().map(ClassCard::new).collect()
}

/// Caption under the preview image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub size_text: String,
}

impl FileInfo {
    pub fn new(file: &ImageFile) -> Self {
        Self {
            name: file.name.clone(),
            size_text: format!("{:.2} KB", file.size() as f64 / 1024.0),
        }
    }
}

pub fn api_status_label(status: &ApiStatus) -> &'static str {
    match status {
        ApiStatus::Unknown => "Checking...",
        ApiStatus::Connected(_) => "Connected \u{2713}",
        ApiStatus::Disconnected(DisconnectReason::HttpStatus(_)) => "Connection Failed \u{2717}",
        ApiStatus::Disconnected(DisconnectReason::Unreachable(_)) => "Not Connected \u{2717}",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HealthReport;
    use crate::result::RankedPrediction;

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            display_name: "Tomato - Bacterial Spot".to_string(),
            confidence_percent: 85.5,
            plant_type: "Tomato".to_string(),
            is_healthy: false,
            advice: "Bacterial spot detected.".to_string(),
            top_predictions: vec![
                RankedPrediction {
                    display_name: "Tomato - Bacterial Spot".to_string(),
                    confidence_percent: 85.5,
                },
                RankedPrediction {
                    display_name: "Tomato - Early Blight".to_string(),
                    confidence_percent: 12.3,
                },
            ],
            analyzed_at: Utc::now(),
            note: None,
        }
    }

    #[test]
    fn test_format_percent_is_exact() {
        assert_eq!(format_percent(85.5), "85.5%");
        assert_eq!(format_percent(12.3), "12.3%");
        assert_eq!(format_percent(2.2), "2.2%");
        assert_eq!(format_percent(100.0), "100%");
        assert_eq!(format_percent(99.99), "99.99%");
    }

    #[test]
    fn test_confidence_bands() {
        assert_eq!(ConfidenceBand::from_percent(80.0), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_percent(79.99), ConfidenceBand::Moderate);
        assert_eq!(ConfidenceBand::from_percent(60.0), ConfidenceBand::Moderate);
        assert_eq!(ConfidenceBand::from_percent(59.9), ConfidenceBand::Low);
    }

    #[test]
    fn test_result_view() {
        let view = ResultView::with_time(&sample_result(), |_| "10:15:00".to_string());
        assert_eq!(view.disease_name, "Tomato - Bacterial Spot");
        assert_eq!(view.confidence_text, "85.5%");
        assert_eq!(view.band, ConfidenceBand::High);
        assert_eq!(view.plant_text, "Plant: Tomato");
        assert_eq!(view.status_text, "Status: Diseased");
        assert_eq!(view.time_text, "Time: 10:15:00");
        assert_eq!(view.predictions.len(), 2);
        assert_eq!(view.predictions[1].rank, 2);
        assert_eq!(view.predictions[1].percent_text, "12.3%");
        assert_eq!(view.predictions[1].bar_width, "12.3%");
    }

    #[test]
    fn test_class_card() {
        let class = DetectableClass {
            id: None,
            display: None,
            plant: "Pepper".to_string(),
            class_type: "Bell".to_string(),
            disease: "Bacterial spot".to_string(),
            is_healthy: false,
        };
        let card = ClassCard::new(&class);
        assert_eq!(card.title, "Pepper Bell");
        assert_eq!(card.disease_text, "Disease: Bacterial spot");
        assert_eq!(card.badge, "DISEASED");
        assert_eq!(card.icon, PlantIcon::Pepper);

        let healthy = DetectableClass {
            plant: "Potato".to_string(),
            class_type: String::new(),
            disease: "healthy".to_string(),
            is_healthy: true,
            ..class
        };
        let card = ClassCard::new(&healthy);
        assert_eq!(card.title, "Potato");
        assert_eq!(card.status_text, "Healthy Plant");
        assert_eq!(card.icon, PlantIcon::Potato);
    }

    #[test]
    fn test_plant_icon_fallback() {
        assert_eq!(PlantIcon::for_plant("Corn"), PlantIcon::Leaf);
        assert_eq!(PlantIcon::for_plant("Tomato"), PlantIcon::Tomato);
    }

    #[test]
    fn test_file_info() {
        let file = ImageFile::new("photo.png", "image/png", vec![0u8; 2 * 1024 * 1024]);
        let info = FileInfo::new(&file);
        assert_eq!(info.name, "photo.png");
        assert_eq!(info.size_text, "2048.00 KB");
    }

    #[test]
    fn test_api_status_labels() {
        assert_eq!(
            api_status_label(&ApiStatus::Connected(HealthReport::default())),
            "Connected \u{2713}"
        );
        assert_eq!(
            api_status_label(&ApiStatus::Disconnected(DisconnectReason::HttpStatus(503))),
            "Connection Failed \u{2717}"
        );
        assert_eq!(
            api_status_label(&ApiStatus::Disconnected(DisconnectReason::Unreachable(
                "refused".to_string()
            ))),
            "Not Connected \u{2717}"
        );
    }
}
