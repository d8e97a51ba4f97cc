use std::backtrace::Backtrace;
use std::panic::PanicHookInfo;

use serde_json::json;
use tokio::runtime::Handle;
use tracing::warn;

use crate::event::{EventLevel, EventPayload};
use crate::reporter::Reporter;

/// Message attached to every hook-reported event.
const UNCAUGHT_MESSAGE: &str = "Uncaught Exception";

/// Registers a process-wide panic hook that reports panics as error events.
///
/// The previous hook is preserved and called after the event is dispatched,
/// so default stderr output (and any other installed hooks) keep working.
/// There is no teardown; the hook lives for the rest of the process.
pub(crate) fn install_panic_hook(reporter: Reporter) {
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        report_panic(&reporter, info);
        prev_hook(info);
    }));
}

/// Builds the uncaught-fault event for one panic and hands it off.
///
/// The hook runs on the panicking thread, outside any async context, so the
/// dispatch is spawned onto the current tokio runtime. A panic on a thread
/// with no runtime cannot be reported and is only logged locally.
fn report_panic(reporter: &Reporter, panic_info: &PanicHookInfo) {
    // `force_capture` ignores RUST_BACKTRACE so the reported trace is never empty.
    let backtrace = Backtrace::force_capture();

    let payload = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    };

    let event = EventPayload {
        name: payload.to_owned(),
        service_name: reporter.service_name().to_owned(),
        level: EventLevel::Error,
        message: UNCAUGHT_MESSAGE.to_owned(),
        data: Some(json!({
            "error_message": payload,
            "stack_trace": backtrace.to_string(),
        })),
        uncaught: true,
    };

    match Handle::try_current() {
        Ok(handle) => {
            let reporter = reporter.clone();
            handle.spawn(async move {
                reporter.dispatch(event).await;
            });
        }
        Err(_) => {
            warn!("panic occurred outside a tokio runtime, uncaught event was not sent");
        }
    }
}
