//! PlantDoc client core: the upload/analyze session, client-side validation,
//! the classification API client, and display view-models.

pub mod api;
pub mod config;
mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod present;
pub mod result;
pub mod session;
pub mod upload;
pub mod workflow;

pub use api::{ClassificationApi, DetectableClass, HealthReport, HttpClassifier, PredictResponse};
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, SessionError, GENERIC_ANALYSIS_FAILURE};
pub use result::{AnalysisResult, RankedPrediction};
pub use session::{
    AnalysisTicket, Completion, Effect, Event, Notice, NoticeKind, Phase, PredictRequest, Session,
};
pub use upload::{check_metadata, ImageFile, ACCEPTED_MIME_TYPES, MAX_UPLOAD_BYTES};
pub use workflow::{ApiStatus, ClassCatalog, DisconnectReason, SessionDriver};
