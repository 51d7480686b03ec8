//! reqwest-backed [`ClassificationApi`](super::ClassificationApi) client.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};
use url::Url;

use super::types::{ClassesResponse, DetectableClass, ErrorBody, HealthReport, PredictResponse};
use super::ClassificationApi;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::upload::ImageFile;

#[cfg(not(target_arch = "wasm32"))]
const USER_AGENT: &str = "PlantDoc/0.1";

/// reqwest-backed client for the classification service.
///
/// On native targets every request is bounded by `request_timeout`. The
/// browser's fetch has no client-wide timeout, so there the caller schedules
/// `Session::time_out` instead.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    base_url: Url,
    request_timeout: Duration,
}

impl HttpClassifier {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url)?;
        let client = build_client(request_timeout)?;

        info!("Classification API client targeting {}", base_url);
        Ok(Self {
            client,
            base_url,
            request_timeout,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Resolve an endpoint against the base URL, keeping any path prefix the
    /// base carries (`http://host/api` + `health` -> `http://host/api/health`).
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_string()));
    }
    // Url::join replaces the last segment unless the path ends with '/'.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(not(target_arch = "wasm32"))]
fn build_client(request_timeout: Duration) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(request_timeout)
        .build()
        .map_err(|e| ApiError::Transport(format!("Failed to build HTTP client: {}", e)))
}

#[cfg(target_arch = "wasm32")]
fn build_client(_request_timeout: Duration) -> Result<reqwest::Client, ApiError> {
    // Browsers forbid overriding User-Agent and fetch has no client timeout.
    reqwest::Client::builder()
        .build()
        .map_err(|e| ApiError::Transport(format!("Failed to build HTTP client: {}", e)))
}

impl ClassificationApi for HttpClassifier {
    async fn health(&self) -> Result<HealthReport, ApiError> {
        let url = self.endpoint("health")?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Health check failed to connect: {}", e);
            ApiError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Health check returned HTTP {}", status.as_u16());
            return Err(ApiError::Status {
                code: status.as_u16(),
                message: status.canonical_reason().map(str::to_string),
            });
        }

        // The body is informational; an OK status alone means connected.
        let report = match response.json::<HealthReport>().await {
            Ok(report) => report,
            Err(e) => {
                debug!("Health body not understood, ignoring: {}", e);
                HealthReport::default()
            }
        };
        info!("API healthy: {:?}", report);
        Ok(report)
    }

    async fn classes(&self) -> Result<Vec<DetectableClass>, ApiError> {
        let url = self.endpoint("classes")?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.json::<ErrorBody>().await.ok().and_then(|b| b.error);
            warn!("Class list returned HTTP {}: {:?}", status.as_u16(), message);
            return Err(ApiError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let body: ClassesResponse = response.json().await?;
        if let Some(count) = body.count {
            if count != body.classes.len() {
                warn!(
                    "Class list count mismatch: server says {}, received {}",
                    count,
                    body.classes.len()
                );
            }
        }
        info!("Loaded {} detectable classes", body.classes.len());
        Ok(body.classes)
    }

    async fn predict(&self, file: &ImageFile) -> Result<PredictResponse, ApiError> {
        let url = self.endpoint("predict")?;
        info!("POST {} ({}, {} bytes)", url, file.name, file.size());

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ApiError::Transport(format!("Invalid MIME type '{}': {}", file.mime_type, e)))?;
        let form = Form::new().part("file", part);

        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();

        // Rejections come back as JSON with a 4xx/5xx status, so always read the body.
        let body = response.text().await?;
        let parsed: PredictResponse = serde_json::from_str(&body).map_err(|e| {
            warn!("Predict returned HTTP {} with unreadable body: {}", status.as_u16(), e);
            ApiError::Decode(e.to_string())
        })?;

        if parsed.success {
            info!(
                "Prediction: {} ({}%)",
                parsed.display_name.as_deref().unwrap_or("?"),
                parsed.confidence.unwrap_or_default()
            );
        } else {
            warn!(
                "Prediction rejected with HTTP {}: {}",
                status.as_u16(),
                parsed.error.as_deref().unwrap_or("no reason given")
            );
        }
        Ok(parsed)
    }
}
