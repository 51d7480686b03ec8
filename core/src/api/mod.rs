//! Client side of the classification service: `GET /health`, `GET /classes`
//! and `POST /predict`.

mod http;
pub mod types;

use crate::error::ApiError;
use crate::upload::ImageFile;

pub use http::HttpClassifier;
pub use types::{DetectableClass, HealthReport, PredictResponse, WirePrediction};

/// The three calls the client makes against the service.
///
/// `HttpClassifier` is the real implementation; tests substitute an in-memory
/// one. Futures are not required to be `Send` so the same trait works on the
/// browser's single-threaded executor.
#[allow(async_fn_in_trait)]
pub trait ClassificationApi {
    /// Succeeds on any HTTP-OK response.
    async fn health(&self) -> Result<HealthReport, ApiError>;

    /// The full set of detectable classes.
    async fn classes(&self) -> Result<Vec<DetectableClass>, ApiError>;

    /// Upload one image. A `success: false` body is `Ok`; only transport and
    /// decoding problems are `Err`.
    async fn predict(&self, file: &ImageFile) -> Result<PredictResponse, ApiError>;
}
