//! Whole-process startup. Kept in its own test binary because it installs
//! the process-wide subscriber.

mod common;

use std::time::Duration;

use hello_trace::config::{AppConfig, ExporterConfig};
use hello_trace::lifecycle::{startup, Shutdown};
use serde_json::Value;

async fn wait_until_serving(client: &reqwest::Client, url: &str) -> reqwest::Response {
    for _ in 0..100 {
        if let Ok(res) = client.get(url).send().await {
            return res;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("service never became connectable at {url}");
}

fn exported_spans(bodies: &[String]) -> Vec<Value> {
    bodies
        .iter()
        .map(|body| serde_json::from_str::<Value>(body).unwrap())
        .flat_map(|request| {
            request["resourceSpans"][0]["scopeSpans"][0]["spans"]
                .as_array()
                .cloned()
                .unwrap_or_default()
        })
        .collect()
}

#[tokio::test]
async fn test_startup_serves_and_flushes_spans_on_shutdown() {
    let (collector, bodies) = common::start_collector().await;
    let downstream = common::start_mock_backend(200, r#"{"message":"pong"}"#).await;
    let addr = common::unused_addr().await;

    let mut config = AppConfig::default();
    config.listener.bind_address = addr.to_string();
    config.downstream.url = format!("http://{downstream}/ping");
    // quiet logs must not silence spans
    config.telemetry.log_level = "warn".into();
    config.telemetry.exporter = ExporterConfig::Otlp {
        endpoint: format!("http://{collector}/v1/traces"),
    };
    // long delay: only the shutdown flush exports
    config.telemetry.batch.scheduled_delay_ms = 60_000;

    let shutdown = Shutdown::new();
    let app = tokio::spawn(startup::run_until(config, shutdown.clone()));

    let res = wait_until_serving(&common::client(), &format!("http://{addr}/test")).await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "Hello World! pong");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(10), app)
        .await
        .expect("service stops after shutdown")
        .unwrap()
        .expect("clean exit");

    let bodies = bodies.lock().unwrap().clone();
    assert!(!bodies.is_empty(), "nothing reached the collector");
    let first: Value = serde_json::from_str(&bodies[0]).unwrap();
    assert_eq!(
        first["resourceSpans"][0]["resource"]["attributes"][0]["value"]["stringValue"],
        "RustDemoService"
    );

    let spans = exported_spans(&bodies);
    let server = spans
        .iter()
        .find(|s| s["name"] == "GET /test")
        .expect("server span exported");
    let client = spans
        .iter()
        .find(|s| s["kind"] == 3)
        .expect("client span exported");
    assert_eq!(server["kind"], 2);
    assert_eq!(client["traceId"], server["traceId"]);
    assert_eq!(client["parentSpanId"], server["spanId"]);
}
