mod support;

use std::sync::{Arc, Mutex};

use login_sdk::{
    generate_state, ErrorKind, HttpMethod, HttpTransport, LoginClient, LoginRecord, LoginStore,
    MemoryLoginStore, ProtocolKind, RequestDescriptor, TransportFailure, TransportFuture,
    TransportResponse, NO_CONTENT_CODE,
};
use tokio::sync::oneshot;
use serde_json::json;
use support::{body_json, harness, harness_with_store, legacy_settings, oauth2_settings};

const TOKEN_BODY: &str = r#"{"access_token":"X","refresh_token":"Y","expires_in":3600,"token_type":"bearer"}"#;

#[tokio::test]
async fn protocol_is_selected_from_settings() {
    assert_eq!(harness(legacy_settings()).client.protocol(), ProtocolKind::LegacyJwt);
    assert_eq!(harness(oauth2_settings()).client.protocol(), ProtocolKind::OAuth2);
}

#[tokio::test]
async fn oauth2_login_stores_both_tokens() {
    let h = harness(oauth2_settings());
    h.transport.respond(200, TOKEN_BODY);

    let record = h
        .client
        .authenticate("alice", "secret", true)
        .await
        .expect("login");

    assert_eq!(record.auth_token.jwt, "X");
    assert_eq!(record.auth_token.refresh_token, "Y");
    assert_eq!(h.store.snapshot(), Some(record));

    let request = h.transport.only_request();
    assert!(request.url.starts_with(
        "https://login.xsolla.com/api/oauth2/login/token?client_id=57&scope=offline&engine="
    ));
    assert_eq!(body_json(&request), json!({"username":"alice","password":"secret"}));
}

#[tokio::test]
async fn oauth2_login_without_refresh_token_is_malformed() {
    let h = harness(oauth2_settings());
    h.transport.respond(200, r#"{"access_token":"X"}"#);

    let err = h
        .client
        .authenticate("alice", "secret", true)
        .await
        .expect_err("should fail");
    assert_eq!(err.code(), NO_CONTENT_CODE);
    assert_eq!(
        err.description(),
        "Can't process response json: no field 'refresh_token' found"
    );
}

#[tokio::test]
async fn exchange_code_posts_form_and_persists_when_remembered() {
    let store = Arc::new(MemoryLoginStore::with_record(LoginRecord::remembering(true)));
    let h = harness_with_store(oauth2_settings(), store);
    h.transport.respond(200, r#"{"access_token":"X","refresh_token":"Y"}"#);

    let record = h
        .client
        .exchange_code_for_token("abc123")
        .await
        .expect("exchange");

    assert_eq!(record.auth_token.jwt, "X");
    assert_eq!(record.auth_token.refresh_token, "Y");
    assert_eq!(
        h.store.snapshot().map(|r| r.auth_token),
        Some(record.auth_token.clone())
    );

    let request = h.transport.only_request();
    assert_eq!(request.method, HttpMethod::Post);
    assert!(request
        .url
        .starts_with("https://login.xsolla.com/api/oauth2/token?engine="));
    assert_eq!(
        request.header("Content-Type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(
        request.body.as_deref(),
        Some("client_id=57&grant_type=authorization_code&code=abc123&redirect_uri=https%3A%2F%2Flogin.xsolla.com%2Fapi%2Fblank")
    );
}

/// Holds the single response until the test releases it.
struct GatedTransport {
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    body: &'static str,
}

impl HttpTransport for GatedTransport {
    fn execute(&self, _request: RequestDescriptor) -> TransportFuture<'_> {
        let gate = self.gate.lock().expect("gate lock").take();
        let body = self.body;
        Box::pin(async move {
            let released = match gate {
                Some(gate) => gate.await.is_ok(),
                None => false,
            };
            if released {
                Ok(TransportResponse::new(200, body))
            } else {
                Err(TransportFailure("gate closed".to_string()))
            }
        })
    }
}

#[tokio::test]
async fn exchange_persists_by_remember_me_at_call_time() {
    let (release, gate) = oneshot::channel();
    let store = Arc::new(MemoryLoginStore::new());
    let client = LoginClient::builder(oauth2_settings())
        .transport(Arc::new(GatedTransport {
            gate: Mutex::new(Some(gate)),
            body: r#"{"access_token":"X","refresh_token":"Y"}"#,
        }))
        .store(store.clone() as Arc<dyn LoginStore>)
        .ignore_process_args()
        .build()
        .expect("client");
    client.launch_social_auth("https://social.example/first", true);

    let exchange = client.exchange_code_for_token("abc123");
    let interleaved = async {
        client.launch_social_auth("https://social.example/second", false);
        let _ = release.send(());
    };
    let (outcome, ()) = tokio::join!(exchange, interleaved);

    let record = outcome.expect("exchange");
    assert_eq!(record.auth_token.jwt, "X");
    assert!(!record.remember_me);
    assert_eq!(
        store.snapshot().map(|saved| saved.auth_token.jwt),
        Some("X".to_string())
    );
}

#[tokio::test]
async fn exchange_code_without_remember_me_leaves_store_empty() {
    let h = harness(oauth2_settings());
    h.transport.respond(200, r#"{"access_token":"X","refresh_token":"Y"}"#);

    h.client
        .exchange_code_for_token("abc123")
        .await
        .expect("exchange");
    assert_eq!(h.client.get_login_data().auth_token.jwt, "X");
    assert_eq!(h.store.snapshot(), Some(LoginRecord::default()));
}

#[tokio::test]
async fn refresh_token_replaces_tokens() {
    let h = harness(oauth2_settings());
    h.transport
        .respond(200, r#"{"access_token":"X2","refresh_token":"Y2"}"#);

    let record = h.client.refresh_token("Y1").await.expect("refresh");
    assert_eq!(record.auth_token.jwt, "X2");
    assert_eq!(record.auth_token.refresh_token, "Y2");
    assert_eq!(
        h.transport.only_request().body.as_deref(),
        Some("client_id=57&grant_type=refresh_token&refresh_token=Y1")
    );
}

#[tokio::test]
async fn refresh_failure_keeps_provider_error() {
    let h = harness(oauth2_settings());
    h.transport.respond(
        400,
        r#"{"error":{"code":"010-021","description":"Refresh token is invalid"}}"#,
    );

    let err = h.client.refresh_token("bad").await.expect_err("should fail");
    assert_eq!(err.code(), "010-021");
    assert_eq!(err.description(), "Refresh token is invalid");
    assert!(!h.client.get_login_data().has_token());
}

#[tokio::test]
async fn session_ticket_chains_into_code_exchange() {
    let h = harness(oauth2_settings());
    h.transport.respond(
        200,
        r#"{"login_url":"https%3A%2F%2Flogin.xsolla.com%2Fapi%2Fblank%3Fcode%3Dabc123%26state%3Dst"}"#,
    );
    h.transport.respond(200, TOKEN_BODY);

    let record = h
        .client
        .authenticate_with_session_ticket("steam", "ticket-1", "480", "st")
        .await
        .expect("cross auth");
    assert_eq!(record.auth_token.jwt, "X");

    let requests = h.transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert!(requests[0]
        .url
        .starts_with("https://login.xsolla.com/api/oauth2/social/steam/cross_auth?client_id=57&"));
    assert_eq!(requests[0].query_param("is_redirect").as_deref(), Some("false"));
    assert!(requests[1]
        .body
        .as_deref()
        .unwrap_or_default()
        .contains("code=abc123"));
}

#[tokio::test]
async fn failed_chained_exchange_is_what_caller_observes() {
    let h = harness(oauth2_settings());
    h.transport.respond(
        200,
        r#"{"login_url":"https://login.xsolla.com/api/blank?code=abc123"}"#,
    );
    h.transport.respond(
        401,
        r#"{"error":{"code":"010-022","description":"Code expired"}}"#,
    );

    let err = h
        .client
        .authenticate_with_session_ticket("steam", "ticket-1", "480", "st")
        .await
        .expect_err("should fail");
    assert_eq!(err.code(), "010-022");
    assert_eq!(h.transport.requests().len(), 2);
}

#[tokio::test]
async fn session_ticket_without_code_does_not_chain() {
    let h = harness(oauth2_settings());
    h.transport
        .respond(200, r#"{"login_url":"https://login.xsolla.com/api/blank"}"#);

    let err = h
        .client
        .authenticate_with_session_ticket("steam", "ticket-1", "480", "st")
        .await
        .expect_err("should fail");
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    assert_eq!(h.transport.requests().len(), 1);
}

#[tokio::test]
async fn oauth2_social_url_carries_state_and_redirect() {
    let h = harness(oauth2_settings());
    h.transport
        .respond(200, r#"{"url":"https://social.example/auth"}"#);

    let state = generate_state();
    let url = h
        .client
        .get_social_auth_url("google", &state)
        .await
        .expect("url");
    assert_eq!(url, "https://social.example/auth");

    let request = h.transport.only_request();
    assert!(request
        .url
        .starts_with("https://login.xsolla.com/api/oauth2/social/google/login_url?client_id=57&"));
    assert_eq!(request.query_param("state"), Some(state));
    assert_eq!(request.query_param("scope").as_deref(), Some("offline"));
}

#[tokio::test]
async fn social_redirect_code_is_exchanged_after_state_check() {
    let h = harness(oauth2_settings());
    h.transport.respond(200, TOKEN_BODY);

    let err = h
        .client
        .complete_social_redirect(
            "https://login.xsolla.com/api/blank?code=abc123&state=other",
            Some("expected"),
        )
        .await
        .expect_err("state mismatch");
    assert!(err.description().contains("state mismatch"));
    assert!(h.transport.requests().is_empty());

    let record = h
        .client
        .complete_social_redirect(
            "https://login.xsolla.com/api/blank?code=abc123&state=expected",
            Some("expected"),
        )
        .await
        .expect("redirect");
    assert_eq!(record.auth_token.jwt, "X");
    assert!(h
        .transport
        .only_request()
        .body
        .as_deref()
        .unwrap_or_default()
        .contains("code=abc123"));
}

#[tokio::test]
async fn oauth2_registration_posts_to_oauth_user_endpoint() {
    let h = harness(oauth2_settings());
    h.transport.respond(200, "{}");

    h.client
        .register("alice", "secret", "a@example.com", "st-1")
        .await
        .expect("register");

    let request = h.transport.only_request();
    assert!(request.url.starts_with(
        "https://login.xsolla.com/api/oauth2/user?response_type=code&client_id=57&state=st-1&redirect_uri="
    ));
    assert_eq!(
        body_json(&request),
        json!({"username":"alice","password":"secret","email":"a@example.com"})
    );
}
