//! Profile-related models

use serde::{Deserialize, Serialize};

/// Profile setting keys understood by the profile service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSettings {
    GameDisplayName,
    AppDisplayName,
    AppDisplayPicRaw,
    Gamerscore,
    Gamertag,
    GameDisplayPicRaw,
    AccountTier,
    TenureLevel,
    XboxOneRep,
    PreferredColor,
    Location,
    Biography,
    Watermarks,
    RealName,
    PublicGamerpic,
}

impl ProfileSettings {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GameDisplayName => "GameDisplayName",
            Self::AppDisplayName => "AppDisplayName",
            Self::AppDisplayPicRaw => "AppDisplayPicRaw",
            Self::Gamerscore => "Gamerscore",
            Self::Gamertag => "Gamertag",
            Self::GameDisplayPicRaw => "GameDisplayPicRaw",
            Self::AccountTier => "AccountTier",
            Self::TenureLevel => "TenureLevel",
            Self::XboxOneRep => "XboxOneRep",
            Self::PreferredColor => "PreferredColor",
            Self::Location => "Location",
            Self::Biography => "Bio",
            Self::Watermarks => "Watermarks",
            Self::RealName => "RealName",
            Self::PublicGamerpic => "PublicGamerpic",
        }
    }
}

/// A single `{id, value}` setting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub id: String,
    pub value: String,
}

/// Profile of one user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    pub id: String,
    #[serde(default)]
    pub host_id: Option<String>,
    #[serde(default)]
    pub settings: Vec<Setting>,
    #[serde(default)]
    pub is_sponsored_user: bool,
}

impl ProfileUser {
    /// Value of `setting`, if the service returned it.
    pub fn setting(&self, setting: ProfileSettings) -> Option<&str> {
        self.settings
            .iter()
            .find(|s| s.id == setting.as_str())
            .map(|s| s.value.as_str())
    }
}

/// Body of every profile lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(default)]
    pub profile_users: Vec<ProfileUser>,
}
