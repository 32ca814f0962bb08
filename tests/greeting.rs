//! End-to-end behaviour of `GET /test`.

use axum::http::StatusCode;
use hello_trace::config::AppConfig;
use hello_trace::http::ErrorBody;

mod common;

#[tokio::test]
async fn test_greets_with_downstream_message() {
    let backend = common::start_mock_backend(200, r#"{"message":"pong"}"#).await;
    let (addr, shutdown) = common::spawn_app(backend).await;

    let res = common::client()
        .get(format!("http://{addr}/test"))
        .send()
        .await
        .expect("service unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "Hello World! pong");

    shutdown.trigger();
}

#[tokio::test]
async fn test_downstream_receives_get_on_ping() {
    let backend = common::start_programmable_backend(|head| async move {
        if head.starts_with("GET /ping HTTP/1.1") {
            (200, r#"{"message":"seen"}"#.to_string())
        } else {
            (404, String::new())
        }
    })
    .await;
    let (addr, shutdown) = common::spawn_app(backend).await;

    let body = common::client()
        .get(format!("http://{addr}/test"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "Hello World! seen");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_downstream_returns_500() {
    let backend = common::unused_addr().await;
    let (addr, shutdown) = common::spawn_app(backend).await;

    let res = common::client()
        .get(format!("http://{addr}/test"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = res.json().await.unwrap();
    assert!(!body.message.is_empty());
    assert!(body.message.starts_with("downstream request failed"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_body_returns_500() {
    let backend = common::start_mock_backend(200, "definitely not json").await;
    let (addr, shutdown) = common::spawn_app(backend).await;

    let res = common::client()
        .get(format!("http://{addr}/test"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = res.json().await.unwrap();
    assert!(body.message.starts_with("malformed downstream response"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_missing_message_field_returns_500() {
    let backend = common::start_mock_backend(200, r#"{"status":"ok"}"#).await;
    let (addr, shutdown) = common::spawn_app(backend).await;

    let res = common::client()
        .get(format!("http://{addr}/test"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    shutdown.trigger();
}

#[tokio::test]
async fn test_non_2xx_downstream_returns_500_every_time() {
    let backend = common::start_mock_backend(503, r#"{"message":"busy"}"#).await;
    let (addr, shutdown) = common::spawn_app(backend).await;
    let client = common::client();

    for _ in 0..2 {
        let res = client
            .get(format!("http://{addr}/test"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = res.json().await.unwrap();
        assert_eq!(
            body.message,
            "downstream responded with status 503 Service Unavailable"
        );
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let backend = common::start_mock_backend(200, r#"{"message":"pong"}"#).await;
    let (addr, shutdown) = common::spawn_app(backend).await;

    let res = common::client()
        .get(format!("http://{addr}/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
}

#[tokio::test]
async fn test_custom_greeting_and_request_id_echo() {
    let backend = common::start_mock_backend(200, r#"{"message":"pong"}"#).await;
    let mut config = AppConfig::default();
    config.downstream.url = format!("http://{backend}/ping");
    config.downstream.greeting = "Hi, ".into();
    let (addr, shutdown) = common::spawn_app_with(config).await;

    let res = common::client()
        .get(format!("http://{addr}/test"))
        .header("x-request-id", "req-42")
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-request-id"], "req-42");
    assert_eq!(res.text().await.unwrap(), "Hi, pong");

    shutdown.trigger();
}

#[tokio::test]
async fn test_server_stops_on_shutdown() {
    let backend = common::start_mock_backend(200, r#"{"message":"pong"}"#).await;
    let (addr, shutdown) = common::spawn_app(backend).await;

    shutdown.trigger();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let result = common::client()
        .get(format!("http://{addr}/test"))
        .send()
        .await;
    assert!(result.is_err());
}
