use serde::{Deserialize, Serialize};

use super::record::{HomeDirectoryDetails, PosixProfile};

/// The merged authorization result of one login attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionDescriptor {
    pub role: Option<String>,
    pub policy: Option<String>,
    pub home: Option<HomeDirectory>,
    pub posix_profile: Option<PosixProfile>,
}

/// Plain path and logical mappings are one field, so a descriptor can never
/// carry both.
#[derive(Debug, Clone, PartialEq)]
pub enum HomeDirectory {
    Path(String),
    Logical(HomeDirectoryDetails),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HomeDirectoryType {
    #[serde(rename = "PATH")]
    Path,
    #[serde(rename = "LOGICAL")]
    Logical,
}

impl HomeDirectory {
    pub fn kind(&self) -> HomeDirectoryType {
        match self {
            HomeDirectory::Path(_) => HomeDirectoryType::Path,
            HomeDirectory::Logical(_) => HomeDirectoryType::Logical,
        }
    }
}

impl SessionDescriptor {
    pub fn home_directory_type(&self) -> Option<HomeDirectoryType> {
        self.home.as_ref().map(HomeDirectory::kind)
    }
}

/// Wire response for the file-transfer runtime. An object with no fields
/// rejects the login.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_directory: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_directory_details: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_directory_type: Option<HomeDirectoryType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub posix_profile: Option<PosixProfile>,
}

impl AuthResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
