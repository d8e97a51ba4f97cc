use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result type for dispatch operations using [`DispatchError`] as the error type.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors that can occur while sending one event to the monitoring endpoint.
///
/// These never cross the public reporting API: every failure is caught,
/// logged locally, and folded into the boolean delivery outcome. Failure is
/// terminal per call; there are no retries.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Network failure, request timeout, or a malformed response body.
    #[error("failed to reach the monitoring endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    ///
    /// `message` carries the server-provided error description when the
    /// response body has the documented shape, the status line otherwise.
    #[error("event rejected by the monitoring endpoint ({status}): {message}")]
    Rejected {
        status: StatusCode,
        message: String,
    },
}
