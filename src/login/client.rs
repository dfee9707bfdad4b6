//! Usage: Login flow orchestrator (public operations over protocol strategy + transport + session).
//!
//! Every operation resolves exactly once with either its success value or an `OperationError`.
//! Session state sits behind a mutex that is never held across an await, so overlapping calls
//! are allowed; the last response to complete wins, as with the callback-based original.

use crate::domain::login_record::{LoginRecord, TargetPlatform, UserAttribute};
use crate::infra::launcher::token_override_from_env;
use crate::infra::login_store::{LoginStore, MemoryLoginStore, TokenStore};
use crate::infra::settings::{LoginSettings, UserDataStorage};
use crate::login::endpoints::{EndpointRegistry, Operation, ProtocolKind};
use crate::login::platform::{ensure_not_redirected, GuardedFlow, NativePlatformAuth};
use crate::login::protocol::{
    interpret_token_grant, protocol_for, AuthProtocol, CrossAuthOutcome, FlowContext, TokenGrant,
};
use crate::login::redirect::{parse_social_redirect, validate_state};
use crate::login::request::{with_query, HttpMethod, RequestBuilder, RequestDescriptor, Telemetry};
use crate::login::response::{classify_outcome, parse_json_object, require_string_field};
use crate::login::transport::{HttpTransport, ReqwestTransport};
use crate::shared::error::{OperationError, OperationResult};
use crate::shared::mutex_ext::MutexExt;
use crate::shared::security::{mask_token, redact_body_for_log};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};

struct SessionState {
    tokens: TokenStore,
    attributes: Vec<UserAttribute>,
    pending_social_url: String,
}

pub struct LoginClient {
    settings: Mutex<LoginSettings>,
    endpoints: EndpointRegistry,
    requests: RequestBuilder,
    protocol: Box<dyn AuthProtocol>,
    transport: Arc<dyn HttpTransport>,
    platform: Option<Arc<dyn NativePlatformAuth>>,
    session: Mutex<SessionState>,
}

pub struct LoginClientBuilder {
    settings: LoginSettings,
    transport: Option<Arc<dyn HttpTransport>>,
    store: Option<Arc<dyn LoginStore>>,
    platform: Option<Arc<dyn NativePlatformAuth>>,
    launcher_token: Option<String>,
    scan_process_args: bool,
}

impl LoginClientBuilder {
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn store(mut self, store: Arc<dyn LoginStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn platform(mut self, platform: Arc<dyn NativePlatformAuth>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Token that overrides the persisted JWT at startup.
    pub fn launcher_token(mut self, token: impl Into<String>) -> Self {
        self.launcher_token = Some(token.into());
        self
    }

    /// Do not look for the launcher parameter in the process arguments.
    pub fn ignore_process_args(mut self) -> Self {
        self.scan_process_args = false;
        self
    }

    pub fn build(self) -> OperationResult<LoginClient> {
        let settings = self.settings;
        settings.validate()?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };
        let store: Arc<dyn LoginStore> = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryLoginStore::new()),
        };

        let launcher_token = self.launcher_token.or_else(|| {
            if self.scan_process_args {
                token_override_from_env(&settings.launcher_jwt_param)
            } else {
                None
            }
        });
        let tokens = TokenStore::load(store, launcher_token.as_deref());

        let protocol = protocol_for(&settings);
        tracing::info!(
            protocol = ?protocol.kind(),
            storage = ?settings.user_data_storage,
            has_token = tokens.record().has_token(),
            "login client initialized"
        );

        Ok(LoginClient {
            endpoints: EndpointRegistry::from_settings(&settings),
            requests: RequestBuilder::new(Telemetry::from_settings(&settings)),
            protocol,
            transport,
            platform: self.platform,
            session: Mutex::new(SessionState {
                tokens,
                attributes: Vec::new(),
                pending_social_url: String::new(),
            }),
            settings: Mutex::new(settings),
        })
    }
}

impl LoginClient {
    pub fn builder(settings: LoginSettings) -> LoginClientBuilder {
        LoginClientBuilder {
            settings,
            transport: None,
            store: None,
            platform: None,
            launcher_token: None,
            scan_process_args: true,
        }
    }

    pub fn protocol(&self) -> ProtocolKind {
        self.protocol.kind()
    }

    pub fn settings(&self) -> LoginSettings {
        self.settings.lock_or_recover().clone()
    }

    /// Override the project identifiers at runtime.
    pub fn initialize(&self, project_id: &str, login_id: &str) {
        let mut settings = self.settings.lock_or_recover();
        settings.project_id = project_id.trim().to_string();
        settings.login_id = login_id.trim().to_string();
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
        state: &str,
    ) -> OperationResult<()> {
        ensure_not_redirected(self.platform.as_deref(), GuardedFlow::Registration)?;

        self.session
            .lock_or_recover()
            .tokens
            .replace(LoginRecord::for_credentials(username, password, false));

        let settings = self.settings();
        let request = self.protocol.registration_request(
            &self.ctx(&settings),
            username,
            password,
            email,
            state,
        )?;
        self.send(request).await?;
        Ok(())
    }

    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> OperationResult<LoginRecord> {
        ensure_not_redirected(self.platform.as_deref(), GuardedFlow::Authentication)?;

        self.session
            .lock_or_recover()
            .tokens
            .replace(LoginRecord::for_credentials(username, password, remember_me));

        let settings = self.settings();
        let request =
            self.protocol
                .login_request(&self.ctx(&settings), username, password, remember_me)?;
        let body = self.send(request).await?;
        let grant = self.protocol.interpret_login(&body)?;
        Ok(self.store_grant(grant, remember_me))
    }

    pub async fn reset_password(&self, identifier: &str) -> OperationResult<()> {
        ensure_not_redirected(self.platform.as_deref(), GuardedFlow::PasswordReset)?;

        let settings = self.settings();
        let field = match settings.user_data_storage {
            UserDataStorage::Xsolla => "username",
            UserDataStorage::Custom => "email",
        };
        let mut body = Map::new();
        body.insert(field.to_string(), Value::String(identifier.to_string()));

        let base = self
            .ctx(&settings)
            .endpoint(Operation::ResetPassword, self.protocol.kind(), None)?;
        let url = with_query(
            &base,
            &[
                ("projectId", settings.login_id.as_str()),
                ("login_url", settings.callback_url.as_str()),
            ],
        );
        let request = self.requests.build(
            &url,
            HttpMethod::Post,
            Some(&Value::Object(body).to_string()),
            None,
        );
        self.send(request).await?;
        Ok(())
    }

    /// Check the stored JWT against the identity service; marks the record verified.
    pub async fn validate_token(&self) -> OperationResult<LoginRecord> {
        let jwt = self.session.lock_or_recover().tokens.record().auth_token.jwt.clone();
        let settings = self.settings();
        let url = self
            .ctx(&settings)
            .endpoint(Operation::ValidateToken, self.protocol.kind(), None)?;
        let request = self.requests.build(&url, HttpMethod::Get, None, Some(&jwt));
        self.send(request).await?;

        let mut session = self.session.lock_or_recover();
        session.tokens.record_mut().auth_token.verified = true;
        session.tokens.save();
        Ok(session.tokens.record().clone())
    }

    pub async fn get_social_auth_url(&self, provider: &str, state: &str) -> OperationResult<String> {
        let settings = self.settings();
        let request = self
            .protocol
            .social_url_request(&self.ctx(&settings), provider, state)?;
        let body = self.send(request).await?;
        let object = parse_json_object(&body)?;
        require_string_field(&object, "url")
    }

    /// Record the URL the embedding UI is about to open and start from an empty record.
    pub fn launch_social_auth(&self, url: &str, remember_me: bool) {
        let mut session = self.session.lock_or_recover();
        session.pending_social_url = url.to_string();
        session.tokens.replace(LoginRecord::remembering(remember_me));
    }

    /// Finish a social login from the redirect URL the embedded browser landed on.
    pub async fn complete_social_redirect(
        &self,
        url: &str,
        expected_state: Option<&str>,
    ) -> OperationResult<LoginRecord> {
        let redirect = parse_social_redirect(url)?;
        if let Some(expected) = expected_state {
            validate_state(&redirect, expected)?;
        }

        if let Some(error) = redirect.error {
            let description = redirect.error_description.unwrap_or_default();
            tracing::warn!(code = %error, "social login was rejected: {}", description);
            return Err(OperationError::http_status(error, description));
        }
        if let Some(token) = redirect.token {
            self.set_token(&token);
            return Ok(self.get_login_data());
        }
        match redirect.code {
            Some(code) => self.exchange_code_for_token(&code).await,
            None => Err(OperationError::malformed("social redirect carries no token or code")),
        }
    }

    pub fn set_token(&self, token: &str) {
        let mut session = self.session.lock_or_recover();
        session.tokens.record_mut().auth_token.jwt = token.to_string();
        session.tokens.save();
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> OperationResult<LoginRecord> {
        let remember_me = self.remember_me();
        let settings = self.settings();
        let url = self
            .ctx(&settings)
            .endpoint(Operation::Token, ProtocolKind::OAuth2, None)?;
        let request = self.requests.build_form(
            &url,
            &[
                ("client_id", settings.client_id.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
        );
        let body = self.send(request).await?;
        let grant = interpret_token_grant(&body)?;
        Ok(self.store_grant(grant, remember_me))
    }

    pub async fn exchange_code_for_token(&self, code: &str) -> OperationResult<LoginRecord> {
        self.exchange_code(code, self.remember_me()).await
    }

    async fn exchange_code(&self, code: &str, remember_me: bool) -> OperationResult<LoginRecord> {
        let settings = self.settings();
        let ctx = self.ctx(&settings);
        let url = ctx.endpoint(Operation::Token, ProtocolKind::OAuth2, None)?;
        let redirect_uri = ctx.blank_redirect()?;
        let request = self.requests.build_form(
            &url,
            &[
                ("client_id", settings.client_id.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri.as_str()),
            ],
        );
        let body = self.send(request).await?;
        let grant = interpret_token_grant(&body)?;
        Ok(self.store_grant(grant, remember_me))
    }

    /// Exchange a platform session ticket. In OAuth2 mode the ticket yields an authorization
    /// code and the caller observes the outcome of the chained code exchange.
    pub async fn authenticate_with_session_ticket(
        &self,
        provider: &str,
        session_ticket: &str,
        app_id: &str,
        state: &str,
    ) -> OperationResult<LoginRecord> {
        let remember_me = self.remember_me();
        let settings = self.settings();
        let request = self.protocol.cross_auth_request(
            &self.ctx(&settings),
            provider,
            session_ticket,
            app_id,
            state,
        )?;
        let body = self.send(request).await?;
        match self.protocol.interpret_cross_auth(&body)? {
            CrossAuthOutcome::Token(grant) => Ok(self.store_grant(grant, remember_me)),
            CrossAuthOutcome::AuthorizationCode(code) => {
                tracing::debug!(code = %mask_token(&code), "session ticket exchanged for code");
                self.exchange_code(&code, remember_me).await
            }
        }
    }

    /// Fetch attributes and replace the cached set. An empty `user_id` means the token owner.
    pub async fn update_user_attributes(
        &self,
        token: &str,
        user_id: &str,
        keys: &[&str],
    ) -> OperationResult<Vec<UserAttribute>> {
        let settings = self.settings();
        let mut body = Map::new();
        body.insert(
            "publisher_project_id".to_string(),
            json!(publisher_project_id(&settings)),
        );
        if !user_id.is_empty() {
            body.insert("user_id".to_string(), json!(user_id));
        }
        body.insert("keys".to_string(), json!(keys));

        let url = self
            .ctx(&settings)
            .endpoint(Operation::UserAttributesGet, self.protocol.kind(), None)?;
        let request = self.requests.build(
            &url,
            HttpMethod::Post,
            Some(&Value::Object(body).to_string()),
            Some(token),
        );
        let response = self.send(request).await?;
        let attributes: Vec<UserAttribute> = serde_json::from_str(&response).map_err(|e| {
            OperationError::malformed(format!("Can't deserialize response json: {e}"))
        })?;

        self.session.lock_or_recover().attributes = attributes.clone();
        Ok(attributes)
    }

    pub async fn modify_user_attributes(
        &self,
        token: &str,
        attributes: &[UserAttribute],
    ) -> OperationResult<()> {
        let settings = self.settings();
        let body = json!({
            "attributes": attributes,
            "publisher_project_id": publisher_project_id(&settings),
        });
        self.post_attribute_update(&settings, token, body).await
    }

    pub async fn remove_user_attributes(&self, token: &str, keys: &[&str]) -> OperationResult<()> {
        let settings = self.settings();
        let body = json!({
            "publisher_project_id": publisher_project_id(&settings),
            "removing_keys": keys,
        });
        self.post_attribute_update(&settings, token, body).await
    }

    pub async fn create_account_linking_code(&self, token: &str) -> OperationResult<String> {
        let settings = self.settings();
        let url = self
            .ctx(&settings)
            .endpoint(Operation::AccountLinkingCode, self.protocol.kind(), None)?;
        let request = self.requests.build(&url, HttpMethod::Post, None, Some(token));
        let body = self.send(request).await?;
        let object = parse_json_object(&body)?;
        require_string_field(&object, "code")
    }

    /// Link a platform account through the game's own backend.
    pub async fn link_account(
        &self,
        user_id: &str,
        platform: TargetPlatform,
        code: &str,
    ) -> OperationResult<()> {
        let settings = self.settings();
        let base = configured_url(&settings.account_linking_url, "account_linking_url")?;
        let url = with_query(
            base,
            &[
                ("user_id", user_id),
                ("platform", platform.as_wire_name()),
                ("code", code),
            ],
        );
        let request = self.requests.build(&url, HttpMethod::Post, None, None);
        self.send(request).await?;
        Ok(())
    }

    pub async fn authenticate_platform_account(
        &self,
        user_id: &str,
        platform: TargetPlatform,
    ) -> OperationResult<LoginRecord> {
        let remember_me = self.remember_me();
        let settings = self.settings();
        let base = configured_url(
            &settings.platform_authentication_url,
            "platform_authentication_url",
        )?;
        let url = with_query(
            base,
            &[("user_id", user_id), ("platform", platform.as_wire_name())],
        );
        let request = self.requests.build(&url, HttpMethod::Get, None, None);
        let body = self.send(request).await?;
        let object = parse_json_object(&body)?;
        let token = require_string_field(&object, "token")?;
        Ok(self.store_grant(TokenGrant::jwt_only(token), remember_me))
    }

    pub fn get_login_data(&self) -> LoginRecord {
        self.session.lock_or_recover().tokens.record().clone()
    }

    pub fn drop_login_data(&self, clear_cache: bool) {
        self.session.lock_or_recover().tokens.drop_record(clear_cache);
    }

    pub fn get_user_attributes(&self) -> Vec<UserAttribute> {
        self.session.lock_or_recover().attributes.clone()
    }

    pub fn get_pending_social_url(&self) -> String {
        self.session.lock_or_recover().pending_social_url.clone()
    }

    fn ctx<'a>(&'a self, settings: &'a LoginSettings) -> FlowContext<'a> {
        FlowContext {
            settings,
            endpoints: &self.endpoints,
            requests: &self.requests,
        }
    }

    async fn post_attribute_update(
        &self,
        settings: &LoginSettings,
        token: &str,
        body: Value,
    ) -> OperationResult<()> {
        let url = self
            .ctx(settings)
            .endpoint(Operation::UserAttributesUpdate, self.protocol.kind(), None)?;
        let request = self.requests.build(
            &url,
            HttpMethod::Post,
            Some(&body.to_string()),
            Some(token),
        );
        self.send(request).await?;
        Ok(())
    }

    fn remember_me(&self) -> bool {
        self.session.lock_or_recover().tokens.record().remember_me
    }

    /// `remember_me` is the choice in effect when the flow started.
    fn store_grant(&self, grant: TokenGrant, remember_me: bool) -> LoginRecord {
        tracing::info!(jwt = %mask_token(&grant.jwt), "received token");

        let mut session = self.session.lock_or_recover();
        let record = session.tokens.record_mut();
        record.auth_token.jwt = grant.jwt;
        if let Some(refresh_token) = grant.refresh_token {
            record.auth_token.refresh_token = refresh_token;
        }
        session.tokens.save_remembering(remember_me);
        session.tokens.record().clone()
    }

    async fn send(&self, request: RequestDescriptor) -> OperationResult<String> {
        let method = request.method.as_str();
        let endpoint = request
            .url
            .split('?')
            .next()
            .unwrap_or_default()
            .to_string();
        tracing::debug!(method, endpoint = %endpoint, "sending login request");

        let result = classify_outcome(self.transport.execute(request).await);
        match &result {
            Ok(body) => tracing::debug!(
                endpoint = %endpoint,
                body = %redact_body_for_log(body),
                "login request succeeded"
            ),
            Err(err) => tracing::warn!(
                endpoint = %endpoint,
                code = err.code(),
                "login request failed: {}",
                err.description()
            ),
        }
        result
    }
}

fn publisher_project_id(settings: &LoginSettings) -> i64 {
    match settings.project_id.trim().parse::<i64>() {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!(project_id = %settings.project_id, "project_id is not numeric; sending 0");
            0
        }
    }
}

fn configured_url<'a>(url: &'a str, name: &str) -> OperationResult<&'a str> {
    let url = url.trim();
    if url.is_empty() {
        return Err(format!("CONFIG_INVALID: {name} is not configured").into());
    }
    Ok(url)
}
