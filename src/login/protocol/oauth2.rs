//! Usage: OAuth2 protocol (authorization code + refresh token grants).

use super::{interpret_token_grant, AuthProtocol, CrossAuthOutcome, FlowContext, TokenGrant};
use crate::login::endpoints::{Operation, ProtocolKind};
use crate::login::request::{with_query, HttpMethod, RequestDescriptor};
use crate::login::response::{missing_field, parse_json_object, query_param, require_string_field};
use crate::shared::error::OperationResult;
use serde_json::json;

const OFFLINE_SCOPE: &str = "offline";

pub(crate) struct OAuth2Protocol;

impl AuthProtocol for OAuth2Protocol {
    fn kind(&self) -> ProtocolKind {
        ProtocolKind::OAuth2
    }

    fn registration_request(
        &self,
        ctx: &FlowContext<'_>,
        username: &str,
        password: &str,
        email: &str,
        state: &str,
    ) -> OperationResult<RequestDescriptor> {
        let base = ctx.endpoint(Operation::Registration, self.kind(), None)?;
        let redirect_uri = ctx.blank_redirect()?;
        let url = with_query(
            &base,
            &[
                ("response_type", "code"),
                ("client_id", ctx.settings.client_id.as_str()),
                ("state", state),
                ("redirect_uri", redirect_uri.as_str()),
            ],
        );
        let body = json!({ "username": username, "password": password, "email": email });
        Ok(ctx
            .requests
            .build(&url, HttpMethod::Post, Some(&body.to_string()), None))
    }

    fn login_request(
        &self,
        ctx: &FlowContext<'_>,
        username: &str,
        password: &str,
        _remember_me: bool,
    ) -> OperationResult<RequestDescriptor> {
        let base = ctx.endpoint(Operation::Login, self.kind(), None)?;
        let url = with_query(
            &base,
            &[
                ("client_id", ctx.settings.client_id.as_str()),
                ("scope", OFFLINE_SCOPE),
            ],
        );
        let body = json!({ "username": username, "password": password });
        Ok(ctx
            .requests
            .build(&url, HttpMethod::Post, Some(&body.to_string()), None))
    }

    fn interpret_login(&self, body: &str) -> OperationResult<TokenGrant> {
        interpret_token_grant(body)
    }

    fn social_url_request(
        &self,
        ctx: &FlowContext<'_>,
        provider: &str,
        state: &str,
    ) -> OperationResult<RequestDescriptor> {
        let base = ctx.endpoint(Operation::SocialLoginUrl, self.kind(), Some(provider))?;
        let redirect_uri = ctx.blank_redirect()?;
        let url = with_query(
            &base,
            &[
                ("client_id", ctx.settings.client_id.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("response_type", "code"),
                ("state", state),
                ("scope", OFFLINE_SCOPE),
            ],
        );
        Ok(ctx.requests.build(&url, HttpMethod::Get, None, None))
    }

    fn cross_auth_request(
        &self,
        ctx: &FlowContext<'_>,
        provider: &str,
        session_ticket: &str,
        app_id: &str,
        state: &str,
    ) -> OperationResult<RequestDescriptor> {
        let base = ctx.endpoint(Operation::CrossAuth, self.kind(), Some(provider))?;
        let redirect_uri = ctx.blank_redirect()?;
        let url = with_query(
            &base,
            &[
                ("client_id", ctx.settings.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", redirect_uri.as_str()),
                ("state", state),
                ("app_id", app_id),
                ("scope", OFFLINE_SCOPE),
                ("session_ticket", session_ticket),
                ("is_redirect", "false"),
            ],
        );
        Ok(ctx.requests.build(&url, HttpMethod::Get, None, None))
    }

    fn interpret_cross_auth(&self, body: &str) -> OperationResult<CrossAuthOutcome> {
        let object = parse_json_object(body)?;
        let login_url = require_string_field(&object, "login_url")?;
        let decoded = urlencoding::decode(&login_url)
            .map(|value| value.into_owned())
            .unwrap_or(login_url);
        let code = query_param(&decoded, "code").ok_or_else(|| missing_field("code"))?;
        Ok(CrossAuthOutcome::AuthorizationCode(code))
    }
}
