use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Provider key used when a user record names no identity provider.
pub const DEFAULT_PROVIDER_KEY: &str = "$default$";

/// Per-principal record, optionally scoped to one identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user: String,

    #[serde(default = "default_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_provider_key: Option<String>,

    #[serde(default = "default_vec")]
    pub ipv4_allow_list: Vec<String>,

    #[serde(default = "ConfigBlock::default")]
    pub config: ConfigBlock,
}

/// Configuration of one authentication backend, keyed by `provider`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityProviderRecord {
    pub provider: String,

    #[serde(default = "default_false")]
    pub disabled: bool,

    #[serde(default = "default_vec")]
    pub ipv4_allow_list: Vec<String>,

    /// Declared provider type, selects the credential verifier.
    #[serde(default = "default_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    /// Connection parameters only the selected verifier understands.
    #[serde(default = "Map::new")]
    pub module_config: Map<String, Value>,

    #[serde(default = "ConfigBlock::default")]
    pub config: ConfigBlock,
}

/// Session fields shared by user and provider records. Every field is
/// independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_directory: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_directory_details: Option<HomeDirectoryDetails>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub posix_profile: Option<PosixProfile>,
}

/// Logical directory mappings. Operators may store them structured or as
/// an already-serialized JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HomeDirectoryDetails {
    Entries(Vec<HomeDirectoryEntry>),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HomeDirectoryEntry {
    pub entry: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PosixProfile {
    pub uid: u64,
    pub gid: u64,

    #[serde(default = "default_vec")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secondary_gids: Vec<u64>,
}

impl UserRecord {
    /// The provider key this user authenticates against.
    pub fn provider_key(&self) -> &str {
        self.provider_key_or(DEFAULT_PROVIDER_KEY)
    }

    pub fn provider_key_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.identity_provider_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => default,
        }
    }
}

fn default_none<T>() -> Option<T> {
    None
}

fn default_vec<T>() -> Vec<T> {
    Vec::new()
}

fn default_false() -> bool {
    false
}
