//! Usage: Legacy JWT protocol (token delivered inside `login_url`).

use super::{AuthProtocol, CrossAuthOutcome, FlowContext, TokenGrant};
use crate::login::endpoints::{Operation, ProtocolKind};
use crate::login::request::{with_query, HttpMethod, RequestDescriptor};
use crate::login::response::{missing_field, parse_json_object, query_param, require_string_field};
use crate::shared::error::OperationResult;
use serde_json::json;

pub(crate) struct LegacyJwtProtocol;

impl LegacyJwtProtocol {
    fn project_query<'a>(ctx: &'a FlowContext<'_>) -> [(&'static str, &'a str); 2] {
        [
            ("projectId", ctx.settings.login_id.as_str()),
            ("login_url", ctx.settings.callback_url.as_str()),
        ]
    }
}

impl AuthProtocol for LegacyJwtProtocol {
    fn kind(&self) -> ProtocolKind {
        ProtocolKind::LegacyJwt
    }

    fn registration_request(
        &self,
        ctx: &FlowContext<'_>,
        username: &str,
        password: &str,
        email: &str,
        _state: &str,
    ) -> OperationResult<RequestDescriptor> {
        let base = ctx.endpoint(Operation::Registration, self.kind(), None)?;
        let url = with_query(&base, &Self::project_query(ctx));
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
        remember_me: bool,
    ) -> OperationResult<RequestDescriptor> {
        let base = ctx.endpoint(Operation::Login, self.kind(), None)?;
        let url = with_query(&base, &Self::project_query(ctx));
        let body = json!({
            "username": username,
            "password": password,
            "remember_me": remember_me,
        });
        Ok(ctx
            .requests
            .build(&url, HttpMethod::Post, Some(&body.to_string()), None))
    }

    fn interpret_login(&self, body: &str) -> OperationResult<TokenGrant> {
        let object = parse_json_object(body)?;
        let login_url = require_string_field(&object, "login_url")?;
        let token = query_param(&login_url, "token").ok_or_else(|| missing_field("token"))?;
        Ok(TokenGrant::jwt_only(token))
    }

    fn social_url_request(
        &self,
        ctx: &FlowContext<'_>,
        provider: &str,
        _state: &str,
    ) -> OperationResult<RequestDescriptor> {
        let base = ctx.endpoint(Operation::SocialLoginUrl, self.kind(), Some(provider))?;
        let url = with_query(&base, &Self::project_query(ctx));
        Ok(ctx.requests.build(&url, HttpMethod::Get, None, None))
    }

    fn cross_auth_request(
        &self,
        ctx: &FlowContext<'_>,
        provider: &str,
        session_ticket: &str,
        app_id: &str,
        _state: &str,
    ) -> OperationResult<RequestDescriptor> {
        let base = ctx.endpoint(Operation::CrossAuth, self.kind(), Some(provider))?;
        let url = with_query(
            &base,
            &[
                ("projectId", ctx.settings.login_id.as_str()),
                ("app_id", app_id),
                ("session_ticket", session_ticket),
            ],
        );
        Ok(ctx.requests.build(&url, HttpMethod::Get, None, None))
    }

    fn interpret_cross_auth(&self, body: &str) -> OperationResult<CrossAuthOutcome> {
        let object = parse_json_object(body)?;
        let token = require_string_field(&object, "token")?;
        Ok(CrossAuthOutcome::Token(TokenGrant::jwt_only(token)))
    }
}
