//! Usage: Unified operation error model (every flow failure becomes a `code` + `description` pair).

use std::sync::Arc;

pub type OperationResult<T> = Result<T, OperationError>;

/// Code reported when no structured provider error is available.
pub const NO_CONTENT_CODE: &str = "204";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The transport failed outright or produced no response.
    Transport,
    /// Non-2xx status, with or without a structured provider error.
    HttpStatus,
    /// 2xx response missing an expected field, or an undeserializable body.
    MalformedResponse,
    /// Rejected locally because a native platform auth subsystem must be used instead.
    PlatformRedirect,
    Config,
    Storage,
    Internal,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {description}")]
pub struct OperationError {
    kind: ErrorKind,
    code: String,
    description: String,
    #[source]
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl OperationError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            description: description.into(),
            source: None,
        }
    }

    pub fn transport(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, NO_CONTENT_CODE, description)
    }

    pub fn http_status(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(ErrorKind::HttpStatus, code, description)
    }

    pub fn malformed(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedResponse, NO_CONTENT_CODE, description)
    }

    pub fn platform_redirect(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(ErrorKind::PlatformRedirect, code, description)
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

fn split_code_message(raw: &str) -> Option<(&str, &str)> {
    let msg = raw.trim();
    let msg = msg.strip_prefix("Error:").unwrap_or(msg).trim();
    if msg.is_empty() {
        return None;
    }

    let (maybe_code, rest) = msg.split_once(':')?;
    let code = maybe_code.trim();
    if code.is_empty() {
        return None;
    }
    let mut chars = code.chars();
    let first = chars.next()?;
    if !first.is_ascii_uppercase() {
        return None;
    }
    if !chars.all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_') {
        return None;
    }
    Some((code, rest.trim()))
}

fn kind_for_code(code: &str) -> ErrorKind {
    if code.starts_with("STORAGE") {
        ErrorKind::Storage
    } else if code.starts_with("CONFIG") {
        ErrorKind::Config
    } else {
        ErrorKind::Internal
    }
}

impl From<String> for OperationError {
    fn from(value: String) -> Self {
        if let Some((code, rest)) = split_code_message(&value) {
            let description = if rest.is_empty() { value.trim() } else { rest };
            return OperationError::new(kind_for_code(code), code, description);
        }
        OperationError::new(ErrorKind::Internal, "INTERNAL_ERROR", value)
    }
}

impl From<&'static str> for OperationError {
    fn from(value: &'static str) -> Self {
        OperationError::from(value.to_string())
    }
}

impl From<OperationError> for String {
    fn from(value: OperationError) -> Self {
        value.to_string()
    }
}
