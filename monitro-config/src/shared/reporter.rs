use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::secret::ApiKey;

/// Behavioral options for an event reporter.
///
/// All fields resolve to their documented defaults when omitted, both via
/// [`Default`] and when deserialized from configuration files. Options are
/// immutable once a reporter has been constructed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ReporterOptions {
    /// Report uncaught panics as error-level events automatically.
    pub hook_exceptions: bool,
    /// Wait for the endpoint to acknowledge each event before returning.
    ///
    /// When `false`, events are handed off to a background task and the
    /// caller never observes delivery failures. Useful for short-lived
    /// (e.g. serverless) callers that cannot afford to wait.
    pub wait_for_response: bool,
    /// Request timeout, in milliseconds, for each send.
    pub timeout_ms: u64,
    /// Suppress all outbound requests, for local development and testing.
    pub dev: bool,
    /// Emit a local warning whenever an event is suppressed in dev mode.
    pub dev_warning: bool,
    /// Per-reporter override for the monitoring endpoint base URL.
    ///
    /// When absent, the URL is resolved once per process from
    /// `MONITRO_API_URL` (see [`crate::api_url`]).
    pub api_url: Option<String>,
}

impl ReporterOptions {
    /// Returns the request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ReporterOptions {
    fn default() -> Self {
        Self {
            hook_exceptions: true,
            wait_for_response: true,
            timeout_ms: 5000,
            dev: false,
            dev_warning: true,
            api_url: None,
        }
    }
}

/// Full configuration for constructing a reporter from files or environment.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReporterConfig {
    /// Name of the service the events are reported under.
    pub service_name: String,
    /// API key for the monitoring endpoint.
    pub api_key: ApiKey,
    /// Reporter options; every omitted field falls back to its default.
    #[serde(default)]
    pub options: ReporterOptions,
}
