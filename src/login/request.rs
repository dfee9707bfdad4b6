//! Usage: Outbound request descriptors (telemetry query + headers, JSON and form bodies).

use crate::infra::settings::LoginSettings;

pub const SDK_NAME: &str = "login";
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Engine/SDK identification attached to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Telemetry {
    pub engine_name: String,
    pub engine_version: String,
    pub sdk_version: String,
}

impl Telemetry {
    pub fn new(engine_name: &str, engine_version: &str) -> Self {
        Self {
            engine_name: engine_name.trim().to_string(),
            engine_version: engine_version.trim().to_string(),
            sdk_version: SDK_VERSION.to_string(),
        }
    }

    pub fn from_settings(settings: &LoginSettings) -> Self {
        Self::new(&settings.engine_name, &settings.engine_version)
    }

    fn query_suffix(&self) -> String {
        format!(
            "engine={}&engine_v={}&sdk={SDK_NAME}&sdk_v={}",
            urlencoding::encode(&self.engine_name.to_ascii_lowercase()),
            urlencoding::encode(&self.engine_version),
            urlencoding::encode(&self.sdk_version),
        )
    }

    fn headers(&self) -> [(String, String); 4] {
        [
            ("X-ENGINE".to_string(), self.engine_name.to_ascii_uppercase()),
            ("X-ENGINE-V".to_string(), self.engine_version.clone()),
            ("X-SDK".to_string(), SDK_NAME.to_ascii_uppercase()),
            ("X-SDK-V".to_string(), self.sdk_version.clone()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestDescriptor {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        let url = reqwest::Url::parse(&self.url).ok()?;
        let value = url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned());
        value
    }
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    telemetry: Telemetry,
}

impl RequestBuilder {
    pub fn new(telemetry: Telemetry) -> Self {
        Self { telemetry }
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// JSON request; `Content-Type` and body are set only for a non-empty body, the bearer
    /// header only for a non-empty token.
    pub fn build(
        &self,
        url: &str,
        method: HttpMethod,
        body: Option<&str>,
        bearer: Option<&str>,
    ) -> RequestDescriptor {
        let mut request = self.base(url, method);

        if let Some(body) = body.filter(|body| !body.is_empty()) {
            if method == HttpMethod::Get {
                tracing::warn!(url = %request.url, "request body is set for a GET request");
            }
            request
                .headers
                .push(("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string()));
            request.body = Some(body.to_string());
        }

        if let Some(token) = bearer.map(str::trim).filter(|token| !token.is_empty()) {
            request
                .headers
                .push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        request
    }

    /// Form-encoded POST for the token endpoint.
    pub fn build_form(&self, url: &str, pairs: &[(&str, &str)]) -> RequestDescriptor {
        let mut request = self.base(url, HttpMethod::Post);
        request
            .headers
            .push(("Content-Type".to_string(), CONTENT_TYPE_FORM.to_string()));
        request.body = Some(encode_form(pairs));
        request
    }

    fn base(&self, url: &str, method: HttpMethod) -> RequestDescriptor {
        let separator = if url.contains('?') { '&' } else { '?' };
        let url = format!("{url}{separator}{}", self.telemetry.query_suffix());
        RequestDescriptor {
            method,
            url,
            headers: self.telemetry.headers().into_iter().collect(),
            body: None,
        }
    }
}

/// `key=value` pairs in order, URL-encoded, joined with `&`; pairs with an empty key or value
/// are skipped.
pub fn encode_form(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Append query parameters (values URL-encoded) to `url`.
pub fn with_query(url: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}
