//! Usage: Endpoint registry (logical operation -> URL, by protocol and user data storage).

use crate::infra::settings::{LoginSettings, UserDataStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolKind {
    LegacyJwt,
    OAuth2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Registration,
    Login,
    ResetPassword,
    /// Needs a provider name.
    SocialLoginUrl,
    /// Needs a provider name.
    CrossAuth,
    Token,
    ValidateToken,
    UserAttributesGet,
    UserAttributesUpdate,
    AccountLinkingCode,
    BlankRedirect,
}

impl Operation {
    pub fn needs_provider(self) -> bool {
        matches!(self, Self::SocialLoginUrl | Self::CrossAuth)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRegistry {
    api_base: String,
    cross_auth_base: String,
}

impl EndpointRegistry {
    pub fn new(api_base: &str, cross_auth_base: &str) -> Self {
        Self {
            api_base: api_base.trim().trim_end_matches('/').to_string(),
            cross_auth_base: cross_auth_base.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &LoginSettings) -> Self {
        Self::new(&settings.api_base_url, &settings.cross_auth_base_url)
    }

    fn oauth_base(&self) -> String {
        format!("{}/oauth2", self.api_base)
    }

    /// URL template for `operation`; `{provider}` marks the provider path segment.
    ///
    /// Returns `None` for combinations the protocol does not define (e.g. the token endpoint
    /// in legacy mode).
    pub fn template(
        &self,
        operation: Operation,
        protocol: ProtocolKind,
        storage: UserDataStorage,
    ) -> Option<String> {
        let api = &self.api_base;
        let proxied = storage == UserDataStorage::Custom;
        let url = match (operation, protocol) {
            (Operation::Registration, ProtocolKind::LegacyJwt) if proxied => {
                format!("{api}/proxy/registration")
            }
            (Operation::Registration, ProtocolKind::LegacyJwt) => format!("{api}/user"),
            (Operation::Registration, ProtocolKind::OAuth2) => format!("{}/user", self.oauth_base()),
            (Operation::Login, ProtocolKind::LegacyJwt) if proxied => format!("{api}/proxy/login"),
            (Operation::Login, ProtocolKind::LegacyJwt) => format!("{api}/login"),
            (Operation::Login, ProtocolKind::OAuth2) => format!("{}/login/token", self.oauth_base()),
            (Operation::ResetPassword, _) if proxied => format!("{api}/proxy/password/reset"),
            (Operation::ResetPassword, _) => format!("{api}/password/reset/request"),
            (Operation::SocialLoginUrl, ProtocolKind::LegacyJwt) => {
                format!("{api}/social/{{provider}}/login_url")
            }
            (Operation::SocialLoginUrl, ProtocolKind::OAuth2) => {
                format!("{}/social/{{provider}}/login_url", self.oauth_base())
            }
            (Operation::CrossAuth, ProtocolKind::LegacyJwt) => {
                format!("{}/{{provider}}", self.cross_auth_base)
            }
            (Operation::CrossAuth, ProtocolKind::OAuth2) => {
                format!("{}/social/{{provider}}/cross_auth", self.oauth_base())
            }
            (Operation::Token, ProtocolKind::OAuth2) => format!("{}/token", self.oauth_base()),
            (Operation::Token, ProtocolKind::LegacyJwt) => return None,
            (Operation::ValidateToken, _) => format!("{api}/users/me"),
            (Operation::UserAttributesGet, _) => format!("{api}/attributes/users/me/get"),
            (Operation::UserAttributesUpdate, _) => format!("{api}/attributes/users/me/update"),
            (Operation::AccountLinkingCode, _) => format!("{api}/users/account/code"),
            (Operation::BlankRedirect, _) => format!("{api}/blank"),
        };
        Some(url)
    }

    /// Resolved URL; `provider` fills the `{provider}` segment (URL-encoded).
    pub fn url(
        &self,
        operation: Operation,
        protocol: ProtocolKind,
        storage: UserDataStorage,
        provider: Option<&str>,
    ) -> Option<String> {
        let template = self.template(operation, protocol, storage)?;
        if !operation.needs_provider() {
            return Some(template);
        }
        let provider = provider.map(str::trim).filter(|p| !p.is_empty())?;
        Some(template.replace("{provider}", &urlencoding::encode(provider)))
    }
}
