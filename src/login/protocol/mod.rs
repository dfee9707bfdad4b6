//! Usage: Auth protocol strategy (legacy JWT vs OAuth2), selected once per client.
//!
//! A protocol only builds requests and interprets successful bodies; dispatch, error
//! classification and session mutation stay in the client.

mod legacy;
mod oauth2;

pub(crate) use legacy::LegacyJwtProtocol;
pub(crate) use oauth2::OAuth2Protocol;

use crate::infra::settings::LoginSettings;
use crate::login::endpoints::{EndpointRegistry, Operation, ProtocolKind};
use crate::login::request::{RequestBuilder, RequestDescriptor};
use crate::login::response::{parse_json_object, require_string_field};
use crate::shared::error::{ErrorKind, OperationError, OperationResult};

/// Tokens issued by a successful grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TokenGrant {
    pub(crate) jwt: String,
    pub(crate) refresh_token: Option<String>,
}

impl TokenGrant {
    pub(crate) fn jwt_only(jwt: String) -> Self {
        Self {
            jwt,
            refresh_token: None,
        }
    }
}

/// What a session-ticket exchange produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CrossAuthOutcome {
    Token(TokenGrant),
    /// Authorization code still to be exchanged at the token endpoint.
    AuthorizationCode(String),
}

/// Per-call view of the configuration a protocol needs.
pub(crate) struct FlowContext<'a> {
    pub(crate) settings: &'a LoginSettings,
    pub(crate) endpoints: &'a EndpointRegistry,
    pub(crate) requests: &'a RequestBuilder,
}

impl FlowContext<'_> {
    pub(crate) fn endpoint(
        &self,
        operation: Operation,
        protocol: ProtocolKind,
        provider: Option<&str>,
    ) -> OperationResult<String> {
        self.endpoints
            .url(operation, protocol, self.settings.user_data_storage, provider)
            .ok_or_else(|| {
                OperationError::new(
                    ErrorKind::Internal,
                    "INTERNAL_ERROR",
                    format!("no endpoint for {operation:?} ({protocol:?}, provider={provider:?})"),
                )
            })
    }

    pub(crate) fn blank_redirect(&self) -> OperationResult<String> {
        self.endpoint(Operation::BlankRedirect, ProtocolKind::OAuth2, None)
    }
}

pub(crate) trait AuthProtocol: Send + Sync {
    fn kind(&self) -> ProtocolKind;

    fn registration_request(
        &self,
        ctx: &FlowContext<'_>,
        username: &str,
        password: &str,
        email: &str,
        state: &str,
    ) -> OperationResult<RequestDescriptor>;

    fn login_request(
        &self,
        ctx: &FlowContext<'_>,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> OperationResult<RequestDescriptor>;

    fn interpret_login(&self, body: &str) -> OperationResult<TokenGrant>;

    fn social_url_request(
        &self,
        ctx: &FlowContext<'_>,
        provider: &str,
        state: &str,
    ) -> OperationResult<RequestDescriptor>;

    fn cross_auth_request(
        &self,
        ctx: &FlowContext<'_>,
        provider: &str,
        session_ticket: &str,
        app_id: &str,
        state: &str,
    ) -> OperationResult<RequestDescriptor>;

    fn interpret_cross_auth(&self, body: &str) -> OperationResult<CrossAuthOutcome>;
}

pub(crate) fn protocol_for(settings: &LoginSettings) -> Box<dyn AuthProtocol> {
    if settings.use_oauth2 {
        Box::new(OAuth2Protocol)
    } else {
        Box::new(LegacyJwtProtocol)
    }
}

/// `access_token` + `refresh_token` body shared by OAuth2 login, refresh and code exchange.
pub(crate) fn interpret_token_grant(body: &str) -> OperationResult<TokenGrant> {
    let object = parse_json_object(body)?;
    let jwt = require_string_field(&object, "access_token")?;
    let refresh_token = require_string_field(&object, "refresh_token")?;
    Ok(TokenGrant {
        jwt,
        refresh_token: Some(refresh_token),
    })
}
