use std::net::SocketAddr;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use uapi_cli::client::{ApiError, ClientConfig, HttpClient, Uapi};
use uapi_cli::commands::{self, OutputFormat};

const GOOD_KEY: &str = "test-key";

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn authorize(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let expected = format!("Bearer {GOOD_KEY}");
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "message": "invalid api key" } })),
        )),
    }
}

async fn extract(headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    authorize(&headers)?;
    let url = body["url"].as_str().unwrap_or_default().to_string();
    if url.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "url is required" })),
        ));
    }
    Ok(Json(json!({
        "data": {
            "source_url": url,
            "title": "Example Domain",
            "headings": ["Example Domain"]
        }
    })))
}

async fn search(headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    authorize(&headers)?;
    let query = body["query"].as_str().unwrap_or_default().to_string();
    Ok(Json(json!({
        "data": {
            "answer_text": format!("You asked: {query}"),
            "sources": [{ "title": "Echo", "url": "https://echo.test" }]
        }
    })))
}

async fn spawn_fake_api() -> SocketAddr {
    let app = Router::new()
        .route("/v1/extract", post(extract))
        .route("/v1/search", post(search));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind fake api");
    let addr = listener.local_addr().expect("listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake api crashed");
    });
    addr
}

fn client_for(addr: SocketAddr, key: &str) -> HttpClient {
    let config = ClientConfig::new(key).with_base_url(format!("http://{addr}/"));
    HttpClient::new(config).expect("client should build")
}

#[tokio::test]
async fn extract_round_trip() {
    let addr = spawn_fake_api().await;
    let client = client_for(addr, GOOD_KEY);

    let envelope = client
        .extract("https://example.com")
        .await
        .expect("extract should succeed");
    assert_eq!(envelope["data"]["source_url"], "https://example.com");
    assert_eq!(envelope["data"]["title"], "Example Domain");
}

#[tokio::test]
async fn search_command_prints_answer() {
    colored::control::set_override(false);
    let addr = spawn_fake_api().await;
    let client = client_for(addr, GOOD_KEY);

    let mut out = Vec::new();
    commands::search(&client, "who wrote dune", OutputFormat::Pretty, &mut out)
        .await
        .expect("search should succeed");
    let output = String::from_utf8(out).unwrap();

    assert!(output.contains("You asked: who wrote dune"));
    assert!(output.contains("• Echo — https://echo.test"));
}

#[tokio::test]
async fn wrong_key_is_an_authentication_error() {
    let addr = spawn_fake_api().await;
    let client = client_for(addr, "stale-key");

    let err = client.search("anything").await.unwrap_err();
    assert!(matches!(err, ApiError::Authentication(_)), "{err:?}");
    assert_eq!(err.to_string(), "invalid api key");
}

#[tokio::test]
async fn bad_request_message_comes_from_body() {
    let addr = spawn_fake_api().await;
    let client = client_for(addr, GOOD_KEY);

    let err = client.extract("").await.unwrap_err();
    assert_eq!(err.kind(), "BadRequestError");
    assert_eq!(err.to_string(), "url is required");
}

#[tokio::test]
async fn unreachable_service_is_a_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr, GOOD_KEY);
    let err = client.extract("https://example.com").await.unwrap_err();
    assert_eq!(err.kind(), "APIConnectionError");
}
