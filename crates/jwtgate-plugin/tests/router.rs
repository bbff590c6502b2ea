//! HTTP router tests

mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::{identity_provider, plugin, sign_rs256};
use jwtgate_plugin::{PluginResponse, router};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn validate_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/validate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = router(Arc::new(plugin(None)));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    assert_eq!(body, json!({"status": "ok", "plugin": "azure-jwt"}));
}

#[tokio::test]
async fn test_validate_success() {
    let (_idp, jwks_url) = identity_provider("abc", 1).await;
    let app = router(Arc::new(plugin(Some(&jwks_url))));
    let token = sign_rs256("abc", &json!({"sub": "u1", "role": "admin"}));

    let response = app
        .oneshot(validate_request(json!({
            "headers": {"Authorization": format!("Bearer {token}")}
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: PluginResponse = read_json(response).await;
    assert_eq!(body.body, "JWT is valid");
    assert_eq!(body.headers.get("role").map(String::as_str), Some("admin"));
    assert_eq!(body.headers.len(), 1);
}

#[tokio::test]
async fn test_validate_status_mirrors_decision() {
    let app = router(Arc::new(plugin(Some("http://127.0.0.1:1/keys"))));

    let response = app
        .clone()
        .oneshot(validate_request(json!({"headers": {}})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: PluginResponse = read_json(response).await;
    assert_eq!(body.status_code, 400);
    assert_eq!(body.body, "Missing Authorization header");

    let response = app
        .oneshot(validate_request(json!({"headers": {"authorization": "Bearer x"}})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validate_without_jwks_url() {
    let app = router(Arc::new(plugin(None)));

    let response = app
        .oneshot(validate_request(json!({"headers": {"Authorization": "Bearer a.b.c"}})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_validate_rejects_non_json() {
    let app = router(Arc::new(plugin(None)));

    let response = app
        .oneshot(
            Request::post("/validate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_serve_over_tcp() {
    let (_idp, jwks_url) = identity_provider("abc", 1).await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(jwtgate_plugin::serve(
        Arc::new(plugin(Some(&jwks_url))),
        listener,
    ));

    let token = sign_rs256("abc", &json!({"sub": "u1", "tid": "contoso"}));
    let body = json!({"headers": {"Authorization": format!("Bearer {token}")}}).to_string();

    // Minimal HTTP/1.1 client over a raw socket
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "POST /validate HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    assert!(raw.starts_with("HTTP/1.1 200"), "{raw}");
    assert!(raw.contains(r#""tid":"contoso""#), "{raw}");

    server.abort();
}
