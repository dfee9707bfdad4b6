//! Usage: Response classification (status + body shape -> body or normalized error) and
//! success-field extraction helpers shared by the flows.

use crate::login::transport::{TransportFailure, TransportResponse};
use crate::shared::error::{OperationError, OperationResult};
use crate::shared::json_fields::{object_field, string_field, FieldLookup};
use reqwest::Url;
use serde_json::{Map, Value};

const NO_RESPONSE: &str = "No response";
const BODY_SNIPPET_MAX_CHARS: usize = 2000;
const RELATIVE_BASE: &str = "http://127.0.0.1/";

/// Classify a finished request.
///
/// `status` is `None` when the transport produced no response object.
pub fn classify(succeeded: bool, status: Option<u16>, body: Option<&str>) -> OperationResult<String> {
    let status = match status {
        Some(status) if succeeded => status,
        _ => return Err(OperationError::transport(NO_RESPONSE)),
    };
    let body = body.unwrap_or_default();

    if (200..300).contains(&status) {
        return Ok(body.to_string());
    }

    if let Some((code, description)) = provider_error(body) {
        return Err(OperationError::http_status(code, description));
    }

    Err(OperationError::http_status(
        crate::shared::error::NO_CONTENT_CODE,
        format!(
            "Invalid response. code={status} error={}",
            body.chars().take(BODY_SNIPPET_MAX_CHARS).collect::<String>()
        ),
    ))
}

pub fn classify_outcome(outcome: Result<TransportResponse, TransportFailure>) -> OperationResult<String> {
    match outcome {
        Ok(response) => classify(true, Some(response.status), Some(&response.body)),
        Err(failure) => {
            tracing::warn!("request produced no response: {}", failure);
            Err(OperationError::transport(NO_RESPONSE).with_source(failure))
        }
    }
}

/// Nested `{"error":{"code":..,"description":..}}`, both strings.
fn provider_error(body: &str) -> Option<(String, String)> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = object_field(value.as_object()?, "error").present()?;
    let code = string_field(error, "code").present()?;
    let description = string_field(error, "description").present()?;
    Some((code, description))
}

pub fn parse_json_object(body: &str) -> OperationResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(OperationError::malformed(
            "Can't process response json: body is not an object",
        )),
        Err(e) => Err(OperationError::malformed(format!("Can't process response json: {e}"))),
    }
}

pub fn require_string_field(object: &Map<String, Value>, name: &str) -> OperationResult<String> {
    match string_field(object, name) {
        FieldLookup::Present(value) => Ok(value),
        FieldLookup::Absent | FieldLookup::WrongType => Err(missing_field(name)),
    }
}

pub fn missing_field(name: &str) -> OperationError {
    OperationError::malformed(format!(
        "Can't process response json: no field '{name}' found"
    ))
}

/// Percent-decoded value of `name` in the query of `url`. Relative URLs are resolved against a
/// placeholder origin; an empty value counts as missing.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => Url::parse(RELATIVE_BASE).ok()?.join(url).ok()?,
    };
    parsed
        .query_pairs()
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}
