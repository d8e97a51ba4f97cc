use monitro_config::Environment;
use std::io::Error;
use std::io::Write;
use std::sync::Once;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::subscriber::{SetGlobalDefaultError, set_global_default};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{self, InitError},
};
use tracing_log::{LogTracer, log_tracer::SetLoggerError};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber, Registry, fmt, layer::SubscriberExt};

/// JSON field name for service identification in logs.
const SERVICE_KEY_IN_LOG: &str = "service";

/// Errors that can occur during tracing initialization.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to build rolling file appender: {0}")]
    InitAppender(#[from] InitError),

    #[error("failed to init log tracer: {0}")]
    InitLogTracer(#[from] SetLoggerError),

    #[error("failed to set global default subscriber: {0}")]
    SetGlobalDefault(#[from] SetGlobalDefaultError),

    #[error("an io error occurred: {0}")]
    Io(#[from] Error),
}

/// Log flusher handle for ensuring logs are written before shutdown.
///
/// Production mode returns a [`WorkerGuard`] that must be kept alive to ensure
/// logs are flushed. Development mode doesn't require flushing.
#[must_use]
pub enum LogFlusher {
    /// Production flusher that ensures logs are written to files.
    Flusher(WorkerGuard),
    /// Development flusher that doesn't require explicit flushing.
    NullFlusher,
}

static INIT_TEST_TRACING: Once = Once::new();

/// Initializes tracing for test environments.
///
/// Call once at the beginning of tests. Set `ENABLE_TRACING=1` to view tracing output:
/// ```bash
/// ENABLE_TRACING=1 cargo test test_name
/// ```
pub fn init_test_tracing() {
    INIT_TEST_TRACING.call_once(|| {
        if std::env::var("ENABLE_TRACING").is_ok() {
            // Needed because if no env is set, it defaults to prod, which logs to files instead of terminal,
            // and we need to log to terminal when `ENABLE_TRACING` env var is set.
            Environment::Dev.set();
            let _log_flusher =
                init_tracing("test").expect("Failed to initialize tracing for tests");
        }
    });
}

/// Global service name storage.
static SERVICE_NAME: OnceLock<String> = OnceLock::new();

/// Sets the global service name for all tracing events.
///
/// The service name will be injected into all structured log entries
/// for identification and filtering purposes.
pub fn set_global_service_name(service_name: String) {
    let _ = SERVICE_NAME.set(service_name);
}

/// Returns the current global service name.
///
/// Returns `None` if no service name has been set.
pub fn get_global_service_name() -> Option<&'static str> {
    SERVICE_NAME.get().map(|s| s.as_str())
}

/// Writer wrapper that injects the service field into JSON log entries.
///
/// Parses JSON log entries and adds a service field if one doesn't already
/// exist, enabling service-based filtering in log aggregation systems.
struct ServiceInjectingWriter<W> {
    inner: W,
}

impl<W> ServiceInjectingWriter<W> {
    /// Creates a new service-injecting writer wrapping the inner writer.
    fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W> Write for ServiceInjectingWriter<W>
where
    W: Write,
{
    /// Writes log data, injecting the service field into JSON entries.
    ///
    /// Attempts to parse the buffer as JSON and inject a service field if:
    /// - A global service name is set
    /// - The content is valid JSON
    /// - No service field already exists
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        // Only try to inject the field if we have one and the content looks like JSON
        if let Some(service_name) = get_global_service_name()
            && let Ok(json_str) = std::str::from_utf8(buf)
        {
            // Try to parse as JSON
            if let Ok(serde_json::Value::Object(mut map)) =
                serde_json::from_str::<serde_json::Value>(json_str)
            {
                // Only inject if "service" field doesn't already exist
                if !map.contains_key(SERVICE_KEY_IN_LOG) {
                    map.insert(
                        SERVICE_KEY_IN_LOG.to_string(),
                        serde_json::Value::String(service_name.to_string()),
                    );

                    // Try to serialize back to JSON
                    if let Ok(modified) = serde_json::to_string(&map) {
                        // Preserve trailing newline if present
                        let output = if json_str.ends_with('\n') {
                            format!("{modified}\n")
                        } else {
                            modified
                        };

                        // Write the modified JSON and return the original buffer length
                        return match self.inner.write(output.as_bytes()) {
                            Ok(_) => Ok(buf.len()),
                            Err(e) => Err(e),
                        };
                    }
                }
            }
        }

        // Fallback to original content
        self.inner.write(buf)
    }

    /// Flushes the underlying writer.
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Initializes tracing for the application.
///
/// Sets up structured logging with environment-appropriate configuration.
/// Production environments log to rotating files, development to console.
pub fn init_tracing(app_name: &str) -> Result<LogFlusher, TracingError> {
    init_tracing_with_service(app_name, None)
}

/// Initializes tracing with an optional service name.
///
/// Like [`init_tracing`] but injects the given service name as a top-level
/// field into each structured log entry.
pub fn init_tracing_with_service(
    app_name: &str,
    service_name: Option<String>,
) -> Result<LogFlusher, TracingError> {
    // Set global service name if provided.
    if let Some(service_name) = service_name {
        set_global_service_name(service_name);
    }

    // Initialize the log tracer to capture logs from the `log` crate
    // and send them to the `tracing` subscriber. This captures logs
    // from libraries that use the `log` crate.
    LogTracer::init()?;

    let is_prod = Environment::load()?.is_prod();

    // Set the default log level to `info` if not specified in the `RUST_LOG` environment variable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_flusher = if is_prod {
        configure_prod_tracing(filter, app_name)?
    } else {
        configure_dev_tracing(filter)?
    };

    Ok(log_flusher)
}

/// Configures tracing for production environments.
///
/// Sets up structured JSON logging to rotating daily files with service injection.
fn configure_prod_tracing(filter: EnvFilter, app_name: &str) -> Result<LogFlusher, TracingError> {
    let filename_suffix = "log";
    let log_dir = "logs";

    let file_appender = rolling::Builder::new()
        .filename_prefix(app_name)
        .filename_suffix(filename_suffix)
        // rotate the log file every day
        .rotation(rolling::Rotation::DAILY)
        // keep a maximum of 5 log files
        .max_log_files(5)
        .build(log_dir)?;

    // Create a non-blocking appender to avoid blocking the logging thread
    // when writing to the file. This is important for performance.
    let (file_appender, guard) = tracing_appender::non_blocking(file_appender);

    let format = fmt::format()
        .with_level(true)
        // ANSI colors are only for terminal output
        .with_ansi(false)
        // Disable target to reduce noise in the logs
        .with_target(false);

    let subscriber = Registry::default().with(filter).with(
        fmt::layer()
            .event_format(format)
            .with_writer(move || ServiceInjectingWriter::new(file_appender.make_writer()))
            .json()
            .with_current_span(true)
            .with_span_list(true),
    );

    set_global_default(subscriber)?;

    Ok(LogFlusher::Flusher(guard))
}

/// Configures tracing for development environments.
///
/// Sets up pretty-printed console logging with ANSI colors for readability.
fn configure_dev_tracing(filter: EnvFilter) -> Result<LogFlusher, TracingError> {
    let format = fmt::format()
        // Emit the log level in the log output
        .with_level(true)
        // Enable ANSI colors for terminal output
        .with_ansi(true)
        // Make it pretty
        .pretty()
        // Disable line number, file, and target in the log output
        // to reduce noise in the logs
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    let subscriber_builder = FmtSubscriber::builder()
        .event_format(format)
        .with_env_filter(filter);

    let subscriber = subscriber_builder.finish();

    set_global_default(subscriber)?;

    Ok(LogFlusher::NullFlusher)
}
