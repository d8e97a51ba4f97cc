/*

Event Reporting Example

This example demonstrates how to construct a reporter and forward events
at every level to a monitoring endpoint.

Prerequisites:
1. A monitoring endpoint reachable over HTTP (set MONITRO_API_URL or pass --api-url)
2. An API key for that endpoint

Usage:
    cargo run -p monitro-examples -- \
        --service-name billing \
        --api-key my-api-key \
        --api-url https://monitoring.example.com/api/v1

Alternatively, put service name, API key, and options into
configuration/base.yaml (plus per-environment overrides selected by
MONITRO_ENVIRONMENT) and run with --from-config.

With --no-wait, events are handed off to background tasks; the process must
stay alive long enough for them to go out, so the example lingers briefly
before exiting.

*/

use anyhow::Context;
use clap::Parser;
use monitro::Reporter;
use monitro_config::load_config;
use monitro_config::shared::{ReporterConfig, ReporterOptions};
use monitro_telemetry::tracing::init_tracing_with_service;
use serde_json::json;
use std::time::Duration;
use tracing::info;

// Command line arguments for the event reporting demo
#[derive(Debug, Parser)]
#[command(name = "send-events", version, about, arg_required_else_help = true)]
struct AppArgs {
    /// Load service name, API key, and options from configuration files
    /// instead of flags
    #[arg(long, conflicts_with_all = ["service_name", "api_key"])]
    from_config: bool,
    /// Name of the service the events are reported under
    #[arg(long, required_unless_present = "from_config")]
    service_name: Option<String>,
    /// API key for the monitoring endpoint
    #[arg(long, required_unless_present = "from_config")]
    api_key: Option<String>,
    /// Base URL of the monitoring endpoint (overrides MONITRO_API_URL)
    #[arg(long)]
    api_url: Option<String>,
    /// Hand events off without waiting for the endpoint to acknowledge them
    #[arg(long)]
    no_wait: bool,
    /// Suppress all outbound requests
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = AppArgs::parse();

    let config = if args.from_config {
        load_config::<ReporterConfig>()?
    } else {
        let service_name = args
            .service_name
            .context("--service-name is required without --from-config")?;
        let api_key = args
            .api_key
            .context("--api-key is required without --from-config")?;

        ReporterConfig {
            service_name,
            api_key: api_key.into(),
            options: ReporterOptions {
                wait_for_response: !args.no_wait,
                api_url: args.api_url,
                dev: args.dev,
                ..Default::default()
            },
        }
    };

    let _log_flusher = init_tracing_with_service(
        env!("CARGO_BIN_NAME"),
        Some(config.service_name.clone()),
    )?;

    let wait_for_response = config.options.wait_for_response;
    let reporter = Reporter::from_config(config);

    let delivered = reporter
        .info("startup", "example service started", None)
        .await;
    info!(delivered, "info event dispatched");

    let delivered = reporter
        .warn(
            "cache-miss-storm",
            "cache hit rate dropped below 10%",
            Some(json!({ "hit_rate": 0.07, "region": "eu-west-1" })),
        )
        .await;
    info!(delivered, "warning event dispatched");

    let delivered = reporter
        .error(
            "db-down",
            "database unreachable",
            Some(json!({ "attempts": 3 })),
        )
        .await;
    info!(delivered, "error event dispatched");

    if !wait_for_response {
        // Give detached sends a chance to leave before the process exits.
        tokio::time::sleep(Duration::from_millis(750)).await;
    }

    Ok(())
}
