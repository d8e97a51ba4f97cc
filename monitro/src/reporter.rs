use std::sync::Arc;

use monitro_config::shared::{ReporterConfig, ReporterOptions};
use monitro_config::{ApiKey, api_url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::{DispatchError, DispatchResult};
use crate::event::{EventLevel, EventPayload};
use crate::hook::install_panic_hook;

/// Path of the event ingestion endpoint, relative to the base URL.
const SEND_PATH: &str = "/send";

/// Header carrying the API key on every request.
const API_KEY_HEADER: &str = "X-API-Key";

/// Error body returned by the endpoint on non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Client for forwarding named log-level events to a monitoring endpoint.
///
/// A [`Reporter`] holds the service identity and behavioral options fixed at
/// construction time and shares one HTTP client across all sends. It is
/// cheap to clone; clones report for the same service.
///
/// Delivery is best effort: [`Reporter::info`], [`Reporter::warn`], and
/// [`Reporter::error`] return a boolean outcome that callers are free to
/// ignore, and no failure is ever propagated as an error.
///
/// # Example
///
/// ```ignore
/// let reporter = Reporter::new("billing", api_key, ReporterOptions::default());
///
/// reporter
///     .info("startup", "billing service started", None)
///     .await;
/// ```
#[derive(Debug, Clone)]
pub struct Reporter {
    inner: Arc<ReporterInner>,
}

#[derive(Debug)]
struct ReporterInner {
    service_name: String,
    api_key: ApiKey,
    options: ReporterOptions,
    /// Base URL resolved once at construction.
    endpoint: String,
    client: reqwest::Client,
}

impl Reporter {
    /// Creates a reporter for the given service.
    ///
    /// Construction never fails and the options are fully resolved at this
    /// point; they are never re-read from the environment afterward. If
    /// `options.hook_exceptions` is set, this registers a process-wide panic
    /// hook that reports uncaught panics as error events. The hook persists
    /// for the lifetime of the process.
    ///
    /// Sends require a running tokio runtime.
    pub fn new(
        service_name: impl Into<String>,
        api_key: impl Into<ApiKey>,
        options: ReporterOptions,
    ) -> Reporter {
        let endpoint = options
            .api_url
            .clone()
            .unwrap_or_else(|| api_url().to_owned());

        let reporter = Reporter {
            inner: Arc::new(ReporterInner {
                service_name: service_name.into(),
                api_key: api_key.into(),
                options,
                endpoint,
                client: reqwest::Client::new(),
            }),
        };

        if reporter.inner.options.hook_exceptions {
            install_panic_hook(reporter.clone());
        }

        reporter
    }

    /// Creates a reporter from a loaded [`ReporterConfig`].
    pub fn from_config(config: ReporterConfig) -> Reporter {
        Reporter::new(config.service_name, config.api_key, config.options)
    }

    /// Returns the name of the service this reporter sends events for.
    pub fn service_name(&self) -> &str {
        &self.inner.service_name
    }

    /// Returns the options this reporter was constructed with.
    pub fn options(&self) -> &ReporterOptions {
        &self.inner.options
    }

    /// Sends an info event.
    ///
    /// Returns whether the event was delivered (or handed off, when
    /// `wait_for_response` is disabled).
    pub async fn info(
        &self,
        name: impl Into<String>,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> bool {
        self.dispatch(self.event(name, message, EventLevel::Info, data))
            .await
    }

    /// Sends a warning event.
    pub async fn warn(
        &self,
        name: impl Into<String>,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> bool {
        self.dispatch(self.event(name, message, EventLevel::Warning, data))
            .await
    }

    /// Sends an error event.
    pub async fn error(
        &self,
        name: impl Into<String>,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> bool {
        self.dispatch(self.event(name, message, EventLevel::Error, data))
            .await
    }

    /// Builds the wire payload for an explicitly reported event.
    fn event(
        &self,
        name: impl Into<String>,
        message: impl Into<String>,
        level: EventLevel,
        data: Option<Value>,
    ) -> EventPayload {
        EventPayload {
            name: name.into(),
            service_name: self.inner.service_name.clone(),
            level,
            message: message.into(),
            data,
            uncaught: false,
        }
    }

    /// Dispatches one event to the monitoring endpoint.
    ///
    /// In dev mode no request is issued at all. With `wait_for_response`
    /// enabled the caller is suspended until the endpoint answers; otherwise
    /// the send proceeds on a detached task and the returned `true` only
    /// means the event was handed off. Every failure is logged here and
    /// folded into the boolean.
    pub(crate) async fn dispatch(&self, payload: EventPayload) -> bool {
        if self.inner.options.dev {
            if self.inner.options.dev_warning {
                warn!(
                    event = %payload.name,
                    "developer mode active, event was not sent"
                );
            }

            return true;
        }

        if self.inner.options.wait_for_response {
            match self.send(&payload).await {
                Ok(()) => {
                    info!(event = %payload.name, "event sent to the monitoring endpoint");
                    true
                }
                Err(err) => {
                    error!(event = %payload.name, "failed to send event: {err}");
                    false
                }
            }
        } else {
            let reporter = self.clone();

            // The request completes (or fails) after the caller has moved on.
            tokio::spawn(async move {
                match reporter.send(&payload).await {
                    Ok(()) => {
                        info!(event = %payload.name, "event sent to the monitoring endpoint");
                    }
                    Err(err) => {
                        error!(event = %payload.name, "failed to send event: {err}");
                    }
                }
            });

            true
        }
    }

    /// Issues the HTTP request for one event.
    async fn send(&self, payload: &EventPayload) -> DispatchResult<()> {
        let response = self
            .inner
            .client
            .post(format!("{}{SEND_PATH}", self.inner.endpoint))
            .header(API_KEY_HEADER, self.inner.api_key.expose())
            .timeout(self.inner.options.timeout())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| status.to_string());

            return Err(DispatchError::Rejected { status, message });
        }

        Ok(())
    }
}
