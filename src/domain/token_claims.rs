//! Usage: JWT payload inspection (decode the claims segment, typed claim lookups).
//!
//! The signature is never verified here; claims are only read for display and routing
//! decisions on the client. `TokenClaims::decode` and `lookup_*` report why a lookup failed,
//! while the `get_*`/`is_*` accessors collapse every failure into an empty/false sentinel.

use crate::shared::json_fields::{self, FieldLookup};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde_json::{Map, Value};

const USER_ID_CLAIM: &str = "sub";
const PROVIDER_CLAIM: &str = "provider";
const MASTER_ACCOUNT_CLAIM: &str = "is_master";

/// Accepts both padded and unpadded input; standard-alphabet characters are mapped first.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenDecodeError {
    #[error("token has no payload segment")]
    MissingPayloadSegment,
    #[error("token payload is not valid base64: {0}")]
    InvalidBase64(String),
    #[error("token payload is not valid json: {0}")]
    InvalidJson(String),
    #[error("token payload is not a json object")]
    NotAnObject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimLookup<T> {
    Present(T),
    Absent,
    WrongType,
    Undecodable(TokenDecodeError),
}

impl<T> ClaimLookup<T> {
    pub fn present(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<FieldLookup<T>> for ClaimLookup<T> {
    fn from(value: FieldLookup<T>) -> Self {
        match value {
            FieldLookup::Present(v) => Self::Present(v),
            FieldLookup::Absent => Self::Absent,
            FieldLookup::WrongType => Self::WrongType,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    claims: Map<String, Value>,
}

impl TokenClaims {
    pub fn decode(token: &str) -> Result<Self, TokenDecodeError> {
        let segment = token
            .trim()
            .split('.')
            .nth(1)
            .ok_or(TokenDecodeError::MissingPayloadSegment)?;

        let normalized: String = segment
            .chars()
            .map(|ch| match ch {
                '+' => '-',
                '/' => '_',
                other => other,
            })
            .collect();
        let bytes = PAYLOAD_ENGINE
            .decode(normalized.as_bytes())
            .map_err(|e| TokenDecodeError::InvalidBase64(e.to_string()))?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(claims)) => Ok(Self { claims }),
            Ok(_) => Err(TokenDecodeError::NotAnObject),
            Err(e) => Err(TokenDecodeError::InvalidJson(e.to_string())),
        }
    }

    pub fn string_claim(&self, name: &str) -> FieldLookup<String> {
        json_fields::string_field(&self.claims, name)
    }

    pub fn bool_claim(&self, name: &str) -> FieldLookup<bool> {
        json_fields::bool_field(&self.claims, name)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.claims
    }
}

pub fn lookup_string_claim(token: &str, name: &str) -> ClaimLookup<String> {
    match TokenClaims::decode(token) {
        Ok(claims) => claims.string_claim(name).into(),
        Err(err) => ClaimLookup::Undecodable(err),
    }
}

pub fn lookup_bool_claim(token: &str, name: &str) -> ClaimLookup<bool> {
    match TokenClaims::decode(token) {
        Ok(claims) => claims.bool_claim(name).into(),
        Err(err) => ClaimLookup::Undecodable(err),
    }
}

fn string_claim_or_empty(token: &str, name: &str) -> String {
    match lookup_string_claim(token, name) {
        ClaimLookup::Present(value) => value,
        ClaimLookup::Undecodable(err) => {
            tracing::error!(claim = name, "can't parse token payload: {err}");
            String::new()
        }
        ClaimLookup::Absent | ClaimLookup::WrongType => {
            tracing::error!(claim = name, "can't find string claim in token payload");
            String::new()
        }
    }
}

/// `sub` claim, or an empty string when it cannot be determined.
pub fn get_user_id(token: &str) -> String {
    string_claim_or_empty(token, USER_ID_CLAIM)
}

/// `provider` claim, or an empty string when it cannot be determined.
pub fn get_provider(token: &str) -> String {
    string_claim_or_empty(token, PROVIDER_CLAIM)
}

pub fn get_parameter(token: &str, name: &str) -> String {
    string_claim_or_empty(token, name)
}

pub fn is_master_account(token: &str) -> bool {
    match lookup_bool_claim(token, MASTER_ACCOUNT_CLAIM) {
        ClaimLookup::Present(value) => value,
        ClaimLookup::Undecodable(err) => {
            tracing::error!("can't parse token payload: {err}");
            false
        }
        ClaimLookup::Absent | ClaimLookup::WrongType => false,
    }
}
