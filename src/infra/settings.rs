//! Usage: Persisted login SDK settings (schema + read/write helpers).

use crate::infra::atomic_file::write_atomic;
use crate::shared::error::OperationResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_API_BASE_URL: &str = "https://login.xsolla.com/api";
pub const DEFAULT_CROSS_AUTH_BASE_URL: &str = "https://livedemo.xsolla.com/sdk/token";
pub const DEFAULT_LAUNCHER_JWT_PARAM: &str = "xsolla-login-jwt";
const DEFAULT_ENGINE_NAME: &str = "rust";
const DEFAULT_ENGINE_VERSION: &str = "unknown";

/// Where user accounts live: directly at the identity provider or behind the game's backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserDataStorage {
    #[default]
    Xsolla,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginSettings {
    pub schema_version: u32,
    pub project_id: String,
    pub login_id: String,
    // OAuth2 client id; required when `use_oauth2` is enabled.
    pub client_id: String,
    pub use_oauth2: bool,
    pub user_data_storage: UserDataStorage,
    pub callback_url: String,
    pub account_linking_url: String,
    pub platform_authentication_url: String,
    pub api_base_url: String,
    pub cross_auth_base_url: String,
    pub engine_name: String,
    pub engine_version: String,
    pub launcher_jwt_param: String,
}

impl Default for LoginSettings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            project_id: String::new(),
            login_id: String::new(),
            client_id: String::new(),
            use_oauth2: false,
            user_data_storage: UserDataStorage::Xsolla,
            callback_url: String::new(),
            account_linking_url: String::new(),
            platform_authentication_url: String::new(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cross_auth_base_url: DEFAULT_CROSS_AUTH_BASE_URL.to_string(),
            engine_name: DEFAULT_ENGINE_NAME.to_string(),
            engine_version: DEFAULT_ENGINE_VERSION.to_string(),
            launcher_jwt_param: DEFAULT_LAUNCHER_JWT_PARAM.to_string(),
        }
    }
}

impl LoginSettings {
    pub fn validate(&self) -> OperationResult<()> {
        for (name, url) in [
            ("api_base_url", &self.api_base_url),
            ("cross_auth_base_url", &self.cross_auth_base_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(format!("CONFIG_INVALID: {name} must be an http(s) url").into());
            }
        }
        if self.use_oauth2 && self.client_id.trim().is_empty() {
            return Err("CONFIG_INVALID: client_id is required when use_oauth2 is enabled".into());
        }
        if self.launcher_jwt_param.trim().is_empty() {
            return Err("CONFIG_INVALID: launcher_jwt_param must not be empty".into());
        }
        Ok(())
    }
}

fn trim_in_place(value: &mut String) -> bool {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        return false;
    }
    *value = trimmed.to_string();
    true
}

fn sanitize_base_url(value: &mut String, default: &str) -> bool {
    let mut changed = trim_in_place(value);
    if value.is_empty() {
        *value = default.to_string();
        return true;
    }
    while value.ends_with('/') {
        value.pop();
        changed = true;
    }
    changed
}

fn sanitize_settings(settings: &mut LoginSettings) -> bool {
    let mut changed = false;

    changed |= trim_in_place(&mut settings.project_id);
    changed |= trim_in_place(&mut settings.login_id);
    changed |= trim_in_place(&mut settings.client_id);
    changed |= trim_in_place(&mut settings.callback_url);
    changed |= trim_in_place(&mut settings.account_linking_url);
    changed |= trim_in_place(&mut settings.platform_authentication_url);
    changed |= sanitize_base_url(&mut settings.api_base_url, DEFAULT_API_BASE_URL);
    changed |= sanitize_base_url(&mut settings.cross_auth_base_url, DEFAULT_CROSS_AUTH_BASE_URL);

    if settings.engine_name.trim().is_empty() {
        settings.engine_name = DEFAULT_ENGINE_NAME.to_string();
        changed = true;
    }
    if settings.engine_version.trim().is_empty() {
        settings.engine_version = DEFAULT_ENGINE_VERSION.to_string();
        changed = true;
    }
    if settings.launcher_jwt_param.trim().is_empty() {
        settings.launcher_jwt_param = DEFAULT_LAUNCHER_JWT_PARAM.to_string();
        changed = true;
    }

    changed
}

/// Files written before the version field existed get stamped; newer versions are left alone.
fn stamp_schema_version(settings: &mut LoginSettings, schema_version_present: bool) -> bool {
    if schema_version_present && settings.schema_version >= SCHEMA_VERSION {
        return false;
    }
    settings.schema_version = SCHEMA_VERSION;
    true
}

fn parse_settings_json(content: &str) -> OperationResult<(LoginSettings, bool)> {
    let raw: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| format!("CONFIG_INVALID: failed to parse settings.json: {e}"))?;
    let schema_version_present = raw.get("schema_version").is_some();
    let settings: LoginSettings = serde_json::from_value(raw)
        .map_err(|e| format!("CONFIG_INVALID: failed to parse settings.json: {e}"))?;
    Ok((settings, schema_version_present))
}

pub fn read(path: &Path) -> OperationResult<LoginSettings> {
    if !path.exists() {
        let settings = LoginSettings::default();
        // Best-effort: create a default settings file so it is discoverable/editable.
        if let Err(err) = write(path, &settings) {
            tracing::warn!(path = %path.display(), "failed to create default settings: {}", err);
        }
        return Ok(settings);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("STORAGE_ERROR: failed to read settings: {e}"))?;
    let (mut settings, schema_version_present) = parse_settings_json(&content)?;

    let mut repaired = false;
    repaired |= stamp_schema_version(&mut settings, schema_version_present);
    repaired |= sanitize_settings(&mut settings);
    settings.validate()?;

    if repaired {
        if let Err(err) = write(path, &settings) {
            tracing::warn!(path = %path.display(), "failed to persist repaired settings: {}", err);
        }
    }

    Ok(settings)
}

pub fn write(path: &Path, settings: &LoginSettings) -> OperationResult<LoginSettings> {
    let mut settings = settings.clone();
    sanitize_settings(&mut settings);
    settings.validate()?;

    let content = serde_json::to_vec_pretty(&settings)
        .map_err(|e| format!("CONFIG_INVALID: failed to serialize settings: {e}"))?;
    write_atomic(path, &content)?;

    Ok(settings)
}
