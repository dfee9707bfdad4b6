use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use login_sdk::{
    ErrorKind, HttpTransport, LoginClient, LoginSettings, ReqwestTransport, NO_CONTENT_CODE,
};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Seen {
    headers: Arc<Mutex<Vec<HashMap<String, String>>>>,
    bodies: Arc<Mutex<Vec<String>>>,
}

impl Seen {
    fn record(&self, headers: &HeaderMap, body: String) {
        let headers = headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        self.headers.lock().expect("headers lock").push(headers);
        self.bodies.lock().expect("bodies lock").push(body);
    }
}

async fn login(
    State(seen): State<Seen>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    seen.record(&headers, body);
    if query.get("sdk").map(String::as_str) != Some("login") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error":{"code":"000-001","description":"missing telemetry"}})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"login_url":"https://game.example/cb?token=server.jwt.value"})),
    )
}

async fn token(State(seen): State<Seen>, headers: HeaderMap, body: String) -> (StatusCode, String) {
    seen.record(&headers, body);
    (StatusCode::BAD_GATEWAY, "upstream down".to_string())
}

async fn users_me(State(seen): State<Seen>, headers: HeaderMap) -> StatusCode {
    seen.record(&headers, String::new());
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer server.jwt.value") => StatusCode::OK,
        _ => StatusCode::UNAUTHORIZED,
    }
}

async fn start_server() -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/oauth2/token", post(token))
        .route("/api/users/me", get(users_me))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/api"), seen)
}

fn settings_for(api_base_url: String) -> LoginSettings {
    LoginSettings {
        login_id: "login-1".to_string(),
        client_id: "57".to_string(),
        callback_url: "https://game.example/cb".to_string(),
        api_base_url,
        engine_name: "bevy".to_string(),
        engine_version: "0.14".to_string(),
        ..LoginSettings::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn password_login_round_trips_over_http() {
    let (base, seen) = start_server().await;
    let client = LoginClient::builder(settings_for(base))
        .transport(Arc::new(ReqwestTransport::new().expect("transport")))
        .ignore_process_args()
        .build()
        .expect("client");

    let record = client
        .authenticate("alice", "secret", false)
        .await
        .expect("login");
    assert_eq!(record.auth_token.jwt, "server.jwt.value");

    let verified = client.validate_token().await.expect("validate");
    assert!(verified.auth_token.verified);

    let headers = seen.headers.lock().expect("headers lock").clone();
    assert_eq!(headers.len(), 2);
    let first = &headers[0];
    assert_eq!(first.get("x-engine").map(String::as_str), Some("BEVY"));
    assert_eq!(first.get("x-engine-v").map(String::as_str), Some("0.14"));
    assert_eq!(first.get("x-sdk").map(String::as_str), Some("LOGIN"));
    assert!(first.contains_key("x-sdk-v"));
    assert_eq!(
        first.get("content-type").map(String::as_str),
        Some("application/json")
    );

    let bodies = seen.bodies.lock().expect("bodies lock").clone();
    let login_body: Value = serde_json::from_str(&bodies[0]).expect("json body");
    assert_eq!(login_body["username"], "alice");
    assert_eq!(login_body["remember_me"], false);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unstructured_http_error_is_normalized() {
    let (base, seen) = start_server().await;
    let client = LoginClient::builder(settings_for(base))
        .transport(Arc::new(ReqwestTransport::new().expect("transport")))
        .ignore_process_args()
        .build()
        .expect("client");

    let err = client.refresh_token("r1").await.expect_err("should fail");
    assert_eq!(err.code(), NO_CONTENT_CODE);
    assert_eq!(err.kind(), ErrorKind::HttpStatus);
    assert!(err.description().contains("code=502"));
    assert!(err.description().contains("upstream down"));

    let bodies = seen.bodies.lock().expect("bodies lock").clone();
    assert_eq!(
        bodies[0],
        "client_id=57&grant_type=refresh_token&refresh_token=r1"
    );
}

#[tokio::test]
async fn unreachable_host_is_a_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let transport = ReqwestTransport::new().expect("transport");
    let request = login_sdk::RequestBuilder::new(login_sdk::Telemetry::new("bevy", "0.14")).build(
        &format!("http://{addr}/api/users/me"),
        login_sdk::HttpMethod::Get,
        None,
        None,
    );
    let outcome = transport.execute(request).await;
    assert!(outcome.is_err());

    let err = login_sdk::login::response::classify_outcome(outcome).expect_err("no response");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.description(), "No response");
}
