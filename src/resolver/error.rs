use thiserror::Error;

/// Terminal outcomes of one resolution. Every variant collapses to the same
/// empty wire response; the detail only goes to the log.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid request: {0}")]
    InvalidRequest(&'static str),

    #[error("No record found for user '{user}', and no default user record")]
    UserNotFound { user: String },

    #[error("Identity provider '{provider}' is not defined")]
    ProviderNotFound { provider: String },

    #[error("Identity provider '{provider}' is disabled")]
    ProviderDisabled { provider: String },

    #[error("Source address '{address}' is not allowed to connect")]
    AddressNotAllowed { address: String },

    #[error("Invalid CIDR '{cidr}' in allow list")]
    InvalidAllowList { cidr: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Unsupported authentication method '{method}'")]
    UnsupportedAuthMethod { method: String },

    #[error("Directory error: {0:#}")]
    Directory(anyhow::Error),

    #[error("Credential verifier error: {0:#}")]
    Verifier(anyhow::Error),
}

impl ResolveError {
    /// Short stable name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::InvalidRequest(_) => "InvalidRequest",
            ResolveError::UserNotFound { .. } => "UserNotFound",
            ResolveError::ProviderNotFound { .. } => "ProviderNotFound",
            ResolveError::ProviderDisabled { .. } => "ProviderDisabled",
            ResolveError::AddressNotAllowed { .. } => "AddressNotAllowed",
            ResolveError::InvalidAllowList { .. } => "InvalidAllowList",
            ResolveError::AuthenticationFailed { .. } => "AuthenticationFailed",
            ResolveError::UnsupportedAuthMethod { .. } => "UnsupportedAuthMethod",
            ResolveError::Directory(_) => "Directory",
            ResolveError::Verifier(_) => "Verifier",
        }
    }
}
