//! Upload/analyze session state machine.
//!
//! The session is a plain owned value. Every operation is synchronous; the
//! one network call is described by a [`PredictRequest`] the host performs,
//! and its outcome comes back through [`Session::complete_analysis`]. Hosts
//! that prefer an event table use [`Session::dispatch`], which returns the
//! effects to carry out.
//!
//! ```text
//! Empty --select--> Previewing --analyze--> Analyzing --ok--> Result
//!   ^                 ^    |                    |
//!   |                 |    |                    +--fail/timeout--> Error
//!   +-----reset-------+----+--------------------------------------+ |
//!                     +---------------------retry-------------------+
//! ```

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::PredictResponse;
use crate::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::error::{ApiError, SessionError};
use crate::result::AnalysisResult;
use crate::upload::{self, ImageFile};

pub const UPLOAD_ACCEPTED: &str = "Image uploaded successfully";
pub const ANALYSIS_COMPLETE: &str = "Analysis complete! Disease detected successfully.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Phase {
    #[default]
    Empty,
    Previewing,
    Analyzing,
    Result,
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Empty => "empty",
            Phase::Previewing => "previewing",
            Phase::Analyzing => "analyzing",
            Phase::Result => "result",
            Phase::Error => "error",
        };
        f.write_str(name)
    }
}

/// Identity of one predict attempt. Outcomes carrying any other ticket than
/// the one in flight are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnalysisTicket(u64);

/// The predict call the host must issue after a successful `analyze()`.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictRequest {
    pub ticket: AnalysisTicket,
    pub file: ImageFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A short, auto-dismissed message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

impl From<&SessionError> for Notice {
    fn from(err: &SessionError) -> Self {
        Notice::error(err.to_string())
    }
}

/// Inputs to [`Session::dispatch`].
#[derive(Debug, Clone)]
pub enum Event {
    FileSelected(ImageFile),
    AnalyzeRequested,
    AnalysisFinished {
        ticket: AnalysisTicket,
        outcome: Result<PredictResponse, ApiError>,
        at: DateTime<Utc>,
    },
    AnalysisTimedOut {
        ticket: AnalysisTicket,
    },
    RetryRequested,
    ResetRequested,
}

/// Work the host performs after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(Notice),
    Predict(PredictRequest),
}

/// How an in-flight analysis ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Succeeded,
    Failed(SessionError),
    /// Outcome for a ticket that is no longer in flight; nothing changed.
    Stale,
}

#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    selected_file: Option<ImageFile>,
    last_result: Option<AnalysisResult>,
    last_error: Option<SessionError>,
    in_flight: Option<AnalysisTicket>,
    next_ticket: u64,
    request_timeout: Duration,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }
}

impl Session {
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            phase: Phase::Empty,
            selected_file: None,
            last_result: None,
            last_error: None,
            in_flight: None,
            next_ticket: 0,
            request_timeout,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selected_file(&self) -> Option<&ImageFile> {
        self.selected_file.as_ref()
    }

    pub fn last_result(&self) -> Option<&AnalysisResult> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn in_flight(&self) -> Option<AnalysisTicket> {
        self.in_flight
    }

    /// How long the host should wait before calling [`Session::time_out`].
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Whether the analyze action should be enabled.
    pub fn can_analyze(&self) -> bool {
        self.phase == Phase::Previewing
    }

    /// Validate and take ownership of a newly picked file.
    ///
    /// A rejected file leaves the session exactly as it was.
    pub fn select_file(&mut self, file: ImageFile) -> Result<(), SessionError> {
        if self.phase == Phase::Analyzing {
            warn!("Ignoring file selection while an analysis is running");
            return Err(SessionError::AnalysisInProgress);
        }

        if let Err(e) = upload::validate(&file) {
            warn!("Rejected {} ({}, {} bytes): {:?}", file.name, file.mime_type, file.size(), e);
            return Err(e);
        }

        info!("Selected {} ({}, {} bytes)", file.name, file.mime_type, file.size());
        self.selected_file = Some(file);
        self.last_result = None;
        self.last_error = None;
        self.phase = Phase::Previewing;
        Ok(())
    }

    /// Start analyzing the selected file. Only valid while previewing.
    pub fn analyze(&mut self) -> Result<PredictRequest, SessionError> {
        if self.phase != Phase::Previewing {
            debug!("Analyze requested in phase {}", self.phase);
            return Err(SessionError::NoFileSelected);
        }
        let Some(file) = self.selected_file.clone() else {
            return Err(SessionError::NoFileSelected);
        };

        self.next_ticket += 1;
        let ticket = AnalysisTicket(self.next_ticket);
        self.in_flight = Some(ticket);
        self.phase = Phase::Analyzing;
        info!("Analyzing {} (attempt {})", file.name, ticket.0);

        Ok(PredictRequest { ticket, file })
    }

    /// Apply the outcome of the predict call issued for `ticket`.
    pub fn complete_analysis(
        &mut self,
        ticket: AnalysisTicket,
        outcome: Result<PredictResponse, ApiError>,
        at: DateTime<Utc>,
    ) -> Completion {
        if self.in_flight != Some(ticket) {
            debug!("Dropping stale outcome for attempt {}", ticket.0);
            return Completion::Stale;
        }
        self.in_flight = None;

        let parsed = match outcome {
            Ok(response) => AnalysisResult::from_response(&response, at),
            Err(ApiError::Timeout) => Err(self.timeout_error()),
            Err(e) => Err(SessionError::Transport {
                detail: e.to_string(),
            }),
        };

        match parsed {
            Ok(result) => {
                info!(
                    "Analysis {} finished: {} ({}%)",
                    ticket.0, result.display_name, result.confidence_percent
                );
                self.last_result = Some(result);
                self.last_error = None;
                self.phase = Phase::Result;
                Completion::Succeeded
            }
            Err(e) => self.fail(e),
        }
    }

    /// Give up on `ticket` if it is still the one in flight.
    pub fn time_out(&mut self, ticket: AnalysisTicket) -> Completion {
        if self.in_flight != Some(ticket) {
            return Completion::Stale;
        }
        self.in_flight = None;
        let err = self.timeout_error();
        self.fail(err)
    }

    /// Go back to the preview of the same file after a failed analysis.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Error || self.selected_file.is_none() {
            return Err(SessionError::NoFileSelected);
        }
        self.last_error = None;
        self.phase = Phase::Previewing;
        Ok(())
    }

    /// Drop everything and return to `Empty`. Any in-flight outcome becomes stale.
    pub fn reset(&mut self) {
        debug!("Resetting session from phase {}", self.phase);
        self.selected_file = None;
        self.last_result = None;
        self.last_error = None;
        self.in_flight = None;
        self.phase = Phase::Empty;
    }

    /// Event table over the operations above.
    pub fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::FileSelected(file) => match self.select_file(file) {
                Ok(()) => vec![Effect::Notify(Notice::success(UPLOAD_ACCEPTED))],
                Err(e) => vec![Effect::Notify(Notice::from(&e))],
            },
            Event::AnalyzeRequested => match self.analyze() {
                Ok(request) => vec![Effect::Predict(request)],
                Err(e) => vec![Effect::Notify(Notice::from(&e))],
            },
            Event::AnalysisFinished { ticket, outcome, at } => {
                completion_effects(self.complete_analysis(ticket, outcome, at))
            }
            Event::AnalysisTimedOut { ticket } => completion_effects(self.time_out(ticket)),
            Event::RetryRequested => match self.retry() {
                Ok(()) => Vec::new(),
                Err(e) => vec![Effect::Notify(Notice::from(&e))],
            },
            Event::ResetRequested => {
                self.reset();
                Vec::new()
            }
        }
    }

    fn timeout_error(&self) -> SessionError {
        SessionError::TimedOut {
            secs: self.request_timeout.as_secs(),
        }
    }

    fn fail(&mut self, err: SessionError) -> Completion {
        match &err {
            SessionError::Transport { detail } => warn!("Analysis failed: {}", detail),
            other => warn!("Analysis failed: {}", other),
        }
        self.last_result = None;
        self.last_error = Some(err.clone());
        self.phase = Phase::Error;
        Completion::Failed(err)
    }
}

fn completion_effects(completion: Completion) -> Vec<Effect> {
    match completion {
        Completion::Succeeded => vec![Effect::Notify(Notice::success(ANALYSIS_COMPLETE))],
        Completion::Failed(e) => vec![Effect::Notify(Notice::from(&e))],
        Completion::Stale => Vec::new(),
    }
}
