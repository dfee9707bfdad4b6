//! Usage: HTTP transport seam (trait + reqwest implementation).

use crate::login::request::RequestDescriptor;
use crate::shared::error::OperationResult;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// The request never produced a response (connect/TLS/IO failure).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct TransportFailure(pub String);

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TransportResponse, TransportFailure>> + Send + 'a>>;

/// Executes one request and resolves exactly once.
pub trait HttpTransport: Send + Sync {
    fn execute(&self, request: RequestDescriptor) -> TransportFuture<'_>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> OperationResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("login-sdk/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("CONFIG_INVALID: failed to build http client: {e}"))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: RequestDescriptor) -> TransportFuture<'_> {
        Box::pin(async move {
            let mut builder = self
                .client
                .request(request.method.to_reqwest(), request.url.as_str());
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| TransportFailure(format!("request failed: {e}")))?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| TransportFailure(format!("response read failed: {e}")))?;

            Ok(TransportResponse { status, body })
        })
    }
}
