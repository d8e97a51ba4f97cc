use std::time::{Duration, Instant};

use monitro::{EventLevel, EventPayload, Reporter};
use monitro_config::shared::{ReporterConfig, ReporterOptions};
use monitro_telemetry::tracing::init_test_tracing;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Options pointing at the given mock server, with the panic hook disabled
/// so tests don't stack process-wide hooks.
fn test_options(server: &MockServer) -> ReporterOptions {
    ReporterOptions {
        hook_exceptions: false,
        api_url: Some(server.uri()),
        ..Default::default()
    }
}

#[test]
fn construction_never_fails_and_populates_defaults() {
    let mut config: ReporterConfig =
        serde_json::from_str(r#"{"service_name": "billing", "api_key": "super-secret"}"#).unwrap();
    config.options.hook_exceptions = false;

    let reporter = Reporter::from_config(config);

    assert_eq!(reporter.service_name(), "billing");
    assert!(reporter.options().wait_for_response);
    assert_eq!(reporter.options().timeout_ms, 5000);
    assert!(!reporter.options().dev);
    assert!(reporter.options().dev_warning);
}

#[tokio::test(flavor = "multi_thread")]
async fn info_resolves_to_success_on_ok_response() {
    init_test_tracing();
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(header("X-API-Key", "super-secret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let reporter = Reporter::new("billing", "super-secret", test_options(&server));

    // Act
    let delivered = reporter.info("startup", "billing service started", None).await;

    // Assert
    assert!(delivered);
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_event_reports_failure() {
    init_test_tracing();
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "bad key" })))
        .expect(1)
        .mount(&server)
        .await;

    let reporter = Reporter::new("billing", "wrong-key", test_options(&server));

    // Act
    let delivered = reporter.error("db-down", "database unreachable", None).await;

    // Assert
    assert!(!delivered);
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn dev_mode_never_issues_a_network_call() {
    init_test_tracing();
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let options = ReporterOptions {
        dev: true,
        ..test_options(&server)
    };
    let reporter = Reporter::new("billing", "super-secret", options);

    // Act: all levels report success without touching the wire.
    assert!(reporter.info("a", "info event", None).await);
    assert!(reporter.warn("b", "warning event", None).await);
    assert!(
        reporter
            .error("c", "error event", Some(json!({ "code": 7 })))
            .await
    );

    // Assert
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn fire_and_forget_returns_before_the_response() {
    init_test_tracing();
    // Arrange: the endpoint takes 500ms to answer.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .expect(1)
        .mount(&server)
        .await;

    let options = ReporterOptions {
        wait_for_response: false,
        ..test_options(&server)
    };
    let reporter = Reporter::new("billing", "super-secret", options);

    // Act
    let start = Instant::now();
    let handed_off = reporter.info("slow-endpoint", "should not block", None).await;
    let elapsed = start.elapsed();

    // Assert: the call came back well before the response delay elapsed,
    // and the request is still delivered afterwards.
    assert!(handed_off);
    assert!(
        elapsed < Duration::from_millis(250),
        "call blocked for {elapsed:?}"
    );

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let requests = server.received_requests().await.unwrap_or_default();
        if !requests.is_empty() {
            break;
        }

        assert!(Instant::now() < deadline, "request was never delivered");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn timeout_is_reported_as_failure() {
    init_test_tracing();
    // Arrange: the response delay exceeds the configured timeout.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let options = ReporterOptions {
        timeout_ms: 100,
        ..test_options(&server)
    };
    let reporter = Reporter::new("billing", "super-secret", options);

    // Act
    let delivered = reporter.info("slow-endpoint", "should time out", None).await;

    // Assert
    assert!(!delivered);
}

#[tokio::test(flavor = "multi_thread")]
async fn wire_payload_round_trips() {
    init_test_tracing();
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let reporter = Reporter::new("billing", "super-secret", test_options(&server));
    let data = json!({ "invoice_id": 4711, "amount": "12.50" });

    // Act
    assert!(
        reporter
            .warn("invoice-retry", "invoice needed a second attempt", Some(data.clone()))
            .await
    );

    // Assert: the body deserializes back to the exact payload.
    let requests = server.received_requests().await.unwrap();
    let sent: EventPayload = serde_json::from_slice(&requests[0].body).unwrap();

    assert_eq!(
        sent,
        EventPayload {
            name: "invoice-retry".to_owned(),
            service_name: "billing".to_owned(),
            level: EventLevel::Warning,
            message: "invoice needed a second attempt".to_owned(),
            data: Some(data),
            uncaught: false,
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn omitted_data_travels_as_null() {
    init_test_tracing();
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let reporter = Reporter::new("billing", "super-secret", test_options(&server));

    // Act
    assert!(reporter.info("startup", "no data attached", None).await);

    // Assert: `data` is present in the raw body as JSON null.
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();

    assert_eq!(body.get("data"), Some(&serde_json::Value::Null));
    assert_eq!(body.get("level"), Some(&json!("info")));
    assert_eq!(body.get("uncaught"), Some(&json!(false)));
}
