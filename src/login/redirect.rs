//! Usage: Social login redirect parsing + OAuth2 state generation/validation.

use crate::shared::error::OperationResult;
use crate::shared::security::constant_time_eq;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use reqwest::Url;

/// Query parameters of the page the embedded browser was redirected to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialRedirect {
    /// Legacy flow: the JWT itself.
    pub token: Option<String>,
    /// OAuth2 flow: authorization code for the token endpoint.
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

pub fn parse_social_redirect(url: &str) -> OperationResult<SocialRedirect> {
    let url = Url::parse(url.trim())
        .map_err(|e| format!("REDIRECT_INVALID: invalid social redirect url: {e}"))?;

    let mut redirect = SocialRedirect::default();
    for (key, value) in url.query_pairs() {
        let value = Some(value.into_owned()).filter(|v| !v.is_empty());
        match key.as_ref() {
            "token" => redirect.token = value,
            "code" => redirect.code = value,
            "state" => redirect.state = value,
            "error" => redirect.error = value,
            "error_description" => redirect.error_description = value,
            _ => {}
        }
    }

    if redirect.token.is_none() && redirect.code.is_none() && redirect.error.is_none() {
        return Err("REDIRECT_INVALID: social redirect carries no token, code or error".into());
    }
    Ok(redirect)
}

pub fn validate_state(redirect: &SocialRedirect, expected_state: &str) -> OperationResult<()> {
    let state = redirect
        .state
        .as_deref()
        .ok_or_else(|| "SEC_INVALID_INPUT: social redirect missing state".to_string())?;
    if !constant_time_eq(state.as_bytes(), expected_state.as_bytes()) {
        return Err("SEC_INVALID_INPUT: social redirect state mismatch".into());
    }
    Ok(())
}

/// Random URL-safe value for the OAuth2 `state` parameter.
pub fn generate_state() -> String {
    let mut random = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut random);
    URL_SAFE_NO_PAD.encode(random)
}
