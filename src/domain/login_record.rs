//! Usage: Session data model (login record, auth token, user attributes, target platforms).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthToken {
    pub jwt: String,
    pub refresh_token: String,
    pub verified: bool,
}

/// Authenticated session state; persisted as a single blob when `remember_me` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRecord {
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    pub remember_me: bool,
    pub auth_token: AuthToken,
}

impl LoginRecord {
    /// Empty record for a password login attempt.
    pub fn for_credentials(username: &str, password: &str, remember_me: bool) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            remember_me,
            auth_token: AuthToken::default(),
        }
    }

    /// Empty record carrying only the remember-me choice (social launch).
    pub fn remembering(remember_me: bool) -> Self {
        Self {
            remember_me,
            ..Self::default()
        }
    }

    pub fn has_token(&self) -> bool {
        !self.auth_token.jwt.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAttribute {
    pub key: String,
    pub value: String,
    pub permission: String,
}

impl UserAttribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            permission: permission.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPlatform {
    PlaystationNetwork,
    XboxLive,
    Xsolla,
    PcStandalone,
    NintendoShop,
    GooglePlay,
    AppStoreIos,
    AndroidStandalone,
    IosStandalone,
    AndroidOther,
    IosOther,
    PcOther,
}

impl TargetPlatform {
    pub fn as_wire_name(self) -> &'static str {
        match self {
            Self::PlaystationNetwork => "playstation_network",
            Self::XboxLive => "xbox_live",
            Self::Xsolla => "xsolla",
            Self::PcStandalone => "pc_standalone",
            Self::NintendoShop => "nintendo_shop",
            Self::GooglePlay => "google_play",
            Self::AppStoreIos => "app_store_ios",
            Self::AndroidStandalone => "android_standalone",
            Self::IosStandalone => "ios_standalone",
            Self::AndroidOther => "android_other",
            Self::IosOther => "ios_other",
            Self::PcOther => "pc_other",
        }
    }
}
