pub mod config;
pub mod error;
pub mod factory;
pub mod identity;
pub mod merge;
pub mod policy;
pub mod response;
pub mod username;

use std::sync::Arc;

use log::{debug, error, info};

use crate::authn::AuthDispatcher;
use crate::directory::Directory;
use crate::types::request::{AuthRequest, LoginRequest};
use crate::types::response::{AuthResponse, SessionDescriptor};

use config::ResolverConfig;
use error::ResolveError;
use identity::IdentityResolver;

/// Turns one login attempt into a session descriptor. Holds everything a
/// request needs, so it can be shared across tasks behind an `Arc`.
pub struct Resolver {
    identity: IdentityResolver,
    dispatcher: AuthDispatcher,

    delimiter: String,
    default_provider: String,
}

impl Resolver {
    pub fn new(db: Arc<Directory>, dispatcher: AuthDispatcher, cfg: &ResolverConfig) -> Self {
        Self {
            identity: IdentityResolver::new(db, cfg.default_user.clone()),
            dispatcher,
            delimiter: cfg.user_name_delimiter.clone(),
            default_provider: cfg.default_provider.clone(),
        }
    }

    /// Parses the login name, finds the records, enforces both allow-lists,
    /// merges the configuration and authenticates, in that order. The first
    /// failing step ends the resolution.
    pub async fn resolve(&self, req: &LoginRequest) -> Result<SessionDescriptor, ResolveError> {
        let ident = username::parse_username(&req.raw_username, &self.delimiter);
        info!(
            "Parsed username '{}' with identity provider hint {:?}",
            ident.username, ident.provider_hint
        );

        let user = self
            .identity
            .resolve_user(&ident.username, ident.provider_hint.as_deref())?;

        info!("Checking user IP allow list");
        policy::check_allowed(&req.source_address, &user.ipv4_allow_list)?;

        let provider_key = user.provider_key_or(&self.default_provider);
        let provider = self.identity.resolve_provider(provider_key)?;

        info!("Checking identity provider IP allow list");
        policy::check_allowed(&req.source_address, &provider.ipv4_allow_list)?;

        let desc = merge::merge_config(&user.config, &provider.config);

        self.dispatcher
            .authenticate(req, &ident.username, &provider, desc)
            .await
    }

    /// Serves one raw request. Every failure is logged and answered with the
    /// empty response, which the runtime treats as a rejected login.
    pub async fn handle(&self, req: &AuthRequest) -> AuthResponse {
        debug!("Handle request: {req:?}");

        let login = match LoginRequest::from_request(req) {
            Ok(login) => login,
            Err(err) => return Self::reject(err),
        };
        info!(
            "Username: {}, ServerId: {}, SourceIp: {}, Protocol: {}",
            login.raw_username,
            login.server_id,
            login.source_address,
            login.protocol.as_deref().unwrap_or("-")
        );

        let desc = match self.resolve(&login).await {
            Ok(desc) => desc,
            Err(err) => return Self::reject(err),
        };

        match response::build_response(desc) {
            Ok(resp) => {
                info!("Completed response: {resp:?}");
                resp
            }
            Err(err) => {
                error!("Build response failed: {err:#}");
                AuthResponse::empty()
            }
        }
    }

    fn reject(err: ResolveError) -> AuthResponse {
        error!("Login rejected [{}]: {err}", err.kind());
        AuthResponse::empty()
    }
}
