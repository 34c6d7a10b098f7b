pub mod ollama;
pub mod stream;

use thiserror::Error;

/// Failures talking to the inference backend before any response bytes have
/// been forwarded to the caller. Failures after streaming has begun are
/// carried in-band as a terminal `StreamEvent` instead (see `stream`).
#[derive(Debug, Error)]
pub enum LlmError {
    /// The backend could not be reached at all (refused, timed out, or the
    /// response body could not be read).
    #[error("backend unavailable: {0}")]
    BackendUnavailable(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend request failed with status {status}")]
    BackendRequestFailed { status: reqwest::StatusCode },
}
