use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resolver::error::ResolveError;

/// Request as delivered by the file-transfer runtime.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

// The password never reaches the logs.
impl fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRequest")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("server_id", &self.server_id)
            .field("source_ip", &self.source_ip)
            .field("protocol", &self.protocol)
            .finish()
    }
}

/// One validated authentication attempt.
#[derive(Clone)]
pub struct LoginRequest {
    pub raw_username: String,
    pub secret: Option<String>,
    pub server_id: String,
    pub source_address: String,
    pub protocol: Option<String>,
}

impl LoginRequest {
    pub fn from_request(req: &AuthRequest) -> Result<Self, ResolveError> {
        let raw_username = match req.username.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return Err(ResolveError::InvalidRequest("username is missing")),
        };
        let server_id = match req.server_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => return Err(ResolveError::InvalidRequest("serverId is missing")),
        };

        let secret = req
            .password
            .as_ref()
            .filter(|p| !p.trim().is_empty())
            .cloned();

        Ok(Self {
            raw_username,
            secret,
            server_id,
            source_address: req.source_ip.clone().unwrap_or_default(),
            protocol: req.protocol.clone(),
        })
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("raw_username", &self.raw_username)
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("server_id", &self.server_id)
            .field("source_address", &self.source_address)
            .field("protocol", &self.protocol)
            .finish()
    }
}
