use thiserror::Error;

/// Fallback shown when the server rejects an image without saying why.
pub const GENERIC_ANALYSIS_FAILURE: &str = "Analysis failed. Please try again.";

/// Errors surfaced to the user by the upload session.
///
/// `Display` is the short message shown in a transient notice. Every variant
/// is recoverable by re-selecting a file, retrying, or resetting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Please upload a valid image file (JPG, PNG, BMP, GIF)")]
    UnsupportedType { mime_type: String },

    #[error("File size must be less than 5MB")]
    TooLarge { size: u64, max: u64 },

    #[error("Please upload an image first")]
    NoFileSelected,

    #[error("An analysis is already running")]
    AnalysisInProgress,

    /// Network, connection, or unreadable-response failure. The detail is
    /// kept for logs; users get the generic message.
    #[error("Network error. Please check API connection.")]
    Transport { detail: String },

    #[error("Analysis timed out after {secs} seconds. Please try again.")]
    TimedOut { secs: u64 },

    /// The server answered with `success: false`.
    #[error("{0}")]
    ServerRejected(String),
}

impl SessionError {
    /// The server's message as received; the generic text only when it is
    /// missing or empty.
    pub fn server_rejected(message: Option<&str>) -> Self {
        match message {
            Some(msg) if !msg.is_empty() => SessionError::ServerRejected(msg.to_string()),
            _ => SessionError::ServerRejected(GENERIC_ANALYSIS_FAILURE.to_string()),
        }
    }

    /// Validation errors leave the phase untouched; the rest end an analysis.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SessionError::UnsupportedType { .. }
                | SessionError::TooLarge { .. }
                | SessionError::NoFileSelected
                | SessionError::AnalysisInProgress
        )
    }
}

/// Failures talking to the classification API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {code}{}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Status { code: u16, message: Option<String> },

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Errors loading or validating client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl From<SessionError> for String {
    fn from(err: SessionError) -> Self {
        err.to_string()
    }
}

impl From<ApiError> for String {
    fn from(err: ApiError) -> Self {
        err.to_string()
    }
}
