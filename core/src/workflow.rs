//! Network operations that feed the session, and a driver that applies them
//! in sequence for hosts without a reactive UI (the CLI, tests).

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::api::{ClassificationApi, DetectableClass, HealthReport};
use crate::error::{ApiError, SessionError};
use crate::result::AnalysisResult;
use crate::session::{Effect, Event, Notice, Phase, Session, UPLOAD_ACCEPTED};
use crate::upload::ImageFile;

pub const API_CONNECTED: &str = "API connected successfully";
pub const API_CONNECTION_FAILED: &str = "API connection failed. Make sure the backend is running.";
pub const CLASSES_UNAVAILABLE: &str =
    "Failed to load detectable diseases. Please check API connection.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DisconnectReason {
    /// The server answered with a non-success status.
    HttpStatus(u16),
    /// No usable answer at all.
    Unreachable(String),
}

/// Advisory connection status. Never gates other operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum ApiStatus {
    #[default]
    Unknown,
    Connected(HealthReport),
    Disconnected(DisconnectReason),
}

impl ApiStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ApiStatus::Connected(_))
    }

    /// Notice to flash after a check, if any. Unreachable stays quiet and
    /// only shows in the status badge.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            ApiStatus::Connected(_) => Some(Notice::success(API_CONNECTED)),
            ApiStatus::Disconnected(DisconnectReason::HttpStatus(_)) => {
                Some(Notice::error(API_CONNECTION_FAILED))
            }
            _ => None,
        }
    }
}

/// The informational list of detectable classes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum ClassCatalog {
    #[default]
    Loading,
    Loaded(Vec<DetectableClass>),
    Unavailable(String),
}

impl ClassCatalog {
    pub fn classes(&self) -> &[DetectableClass] {
        match self {
            ClassCatalog::Loaded(classes) => classes,
            _ => &[],
        }
    }
}

/// `GET /health` reduced to a status value.
pub async fn check_api_health<A: ClassificationApi>(api: &A) -> ApiStatus {
    match api.health().await {
        Ok(report) => ApiStatus::Connected(report),
        Err(ApiError::Status { code, .. }) => {
            warn!("API health check failed with HTTP {}", code);
            ApiStatus::Disconnected(DisconnectReason::HttpStatus(code))
        }
        Err(e) => {
            warn!("API not reachable: {}", e);
            ApiStatus::Disconnected(DisconnectReason::Unreachable(e.to_string()))
        }
    }
}

/// `GET /classes` reduced to a catalog value. Failures are non-fatal.
pub async fn load_detectable_classes<A: ClassificationApi>(api: &A) -> ClassCatalog {
    match api.classes().await {
        Ok(classes) => ClassCatalog::Loaded(classes),
        Err(e) => {
            warn!("Error loading classes: {}", e);
            ClassCatalog::Unavailable(e.to_string())
        }
    }
}

/// Owns a session and an API and runs operations one at a time.
pub struct SessionDriver<A> {
    api: A,
    session: Session,
    api_status: ApiStatus,
    catalog: ClassCatalog,
    notices: Vec<Notice>,
}

impl<A: ClassificationApi> SessionDriver<A> {
    pub fn new(api: A, session: Session) -> Self {
        Self {
            api,
            session,
            api_status: ApiStatus::Unknown,
            catalog: ClassCatalog::Loading,
            notices: Vec::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn api_status(&self) -> &ApiStatus {
        &self.api_status
    }

    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    /// Notices produced since the last call, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Page-load work: health check, then the class list.
    pub async fn startup(&mut self) {
        self.check_api_health().await;
        self.load_detectable_classes().await;
    }

    pub async fn check_api_health(&mut self) -> &ApiStatus {
        self.api_status = check_api_health(&self.api).await;
        if let Some(notice) = self.api_status.notice() {
            self.notices.push(notice);
        }
        &self.api_status
    }

    pub async fn load_detectable_classes(&mut self) -> &ClassCatalog {
        self.catalog = load_detectable_classes(&self.api).await;
        &self.catalog
    }

    pub fn select_file(&mut self, file: ImageFile) -> Result<(), SessionError> {
        let outcome = self.session.select_file(file);
        self.notices.push(match &outcome {
            Ok(()) => Notice::success(UPLOAD_ACCEPTED),
            Err(e) => Notice::from(e),
        });
        outcome
    }

    /// Send the previewed file and wait for the outcome.
    pub async fn analyze(&mut self) -> Result<&AnalysisResult, SessionError> {
        let request = match self.session.analyze() {
            Ok(request) => request,
            Err(e) => {
                self.notices.push(Notice::from(&e));
                return Err(e);
            }
        };

        let outcome = self.api.predict(&request.file).await;
        self.run(Event::AnalysisFinished {
            ticket: request.ticket,
            outcome,
            at: Utc::now(),
        });

        match (self.session.phase(), self.session.last_result()) {
            (Phase::Result, Some(result)) => Ok(result),
            _ => Err(self
                .session
                .last_error()
                .cloned()
                .unwrap_or_else(|| SessionError::server_rejected(None))),
        }
    }

    pub fn retry(&mut self) -> Result<(), SessionError> {
        self.session.retry()
    }

    pub fn reset(&mut self) {
        info!("Session reset");
        self.run(Event::ResetRequested);
    }

    fn run(&mut self, event: Event) {
        for effect in self.session.dispatch(event) {
            match effect {
                Effect::Notify(notice) => self.notices.push(notice),
                // analyze() issues predicts itself and never routes them here.
                Effect::Predict(request) => {
                    warn!("Unexpected predict effect for attempt {:?}", request.ticket)
                }
            }
        }
    }
}
