use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use login_sdk::{
    HttpTransport, LoginClient, LoginSettings, LoginStore, MemoryLoginStore, RequestDescriptor,
    TransportFailure, TransportFuture, TransportResponse, UserDataStorage,
};

/// Scripted transport: answers requests in order and keeps every request it saw.
#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, TransportFailure>>>,
    requests: Mutex<Vec<RequestDescriptor>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Ok(TransportResponse::new(status, body)));
    }

    #[allow(dead_code)]
    pub fn fail(&self, message: &str) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Err(TransportFailure(message.to_string())));
    }

    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().expect("requests lock").clone()
    }

    #[allow(dead_code)]
    pub fn only_request(&self) -> RequestDescriptor {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().expect("one request")
    }
}

impl HttpTransport for RecordingTransport {
    fn execute(&self, request: RequestDescriptor) -> TransportFuture<'_> {
        self.requests.lock().expect("requests lock").push(request);
        let next = self
            .responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(TransportFailure("no scripted response".to_string())));
        Box::pin(async move { next })
    }
}

#[allow(dead_code)]
pub fn legacy_settings() -> LoginSettings {
    LoginSettings {
        project_id: "77640".to_string(),
        login_id: "login-1".to_string(),
        callback_url: "https://game.example/cb".to_string(),
        account_linking_url: "https://backend.example/link".to_string(),
        platform_authentication_url: "https://backend.example/platform_auth".to_string(),
        ..LoginSettings::default()
    }
}

#[allow(dead_code)]
pub fn oauth2_settings() -> LoginSettings {
    LoginSettings {
        client_id: "57".to_string(),
        use_oauth2: true,
        ..legacy_settings()
    }
}

#[allow(dead_code)]
pub fn proxied(settings: LoginSettings) -> LoginSettings {
    LoginSettings {
        user_data_storage: UserDataStorage::Custom,
        ..settings
    }
}

#[allow(dead_code)]
pub struct Harness {
    pub client: LoginClient,
    pub transport: Arc<RecordingTransport>,
    pub store: Arc<MemoryLoginStore>,
}

#[allow(dead_code)]
pub fn harness(settings: LoginSettings) -> Harness {
    harness_with_store(settings, Arc::new(MemoryLoginStore::new()))
}

#[allow(dead_code)]
pub fn harness_with_store(settings: LoginSettings, store: Arc<MemoryLoginStore>) -> Harness {
    let transport = RecordingTransport::new();
    let client = LoginClient::builder(settings)
        .transport(transport.clone())
        .store(store.clone() as Arc<dyn LoginStore>)
        .ignore_process_args()
        .build()
        .expect("build client");
    Harness {
        client,
        transport,
        store,
    }
}

/// Unsigned token with the given JSON payload.
#[allow(dead_code)]
pub fn jwt_with(payload: &str) -> String {
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#),
        URL_SAFE_NO_PAD.encode(payload)
    )
}

#[allow(dead_code)]
pub fn body_json(request: &RequestDescriptor) -> serde_json::Value {
    serde_json::from_str(request.body.as_deref().expect("request body")).expect("json body")
}
