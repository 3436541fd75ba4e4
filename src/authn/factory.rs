use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use super::cognito::CognitoVerifier;
use super::config::AuthnConfig;
use super::AuthDispatcher;

pub const COGNITO_MODULE: &str = "cognito";

/// Builds the verifier dispatch table from configuration.
pub struct AuthnFactory;

impl AuthnFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn build_dispatcher(&self, cfg: &AuthnConfig) -> Result<AuthDispatcher> {
        let mut dispatcher = AuthDispatcher::new(cfg.default_module.clone());

        let cognito = CognitoVerifier::new(&cfg.cognito).context("init cognito verifier")?;
        if !cfg.cognito.endpoint.is_empty() {
            warn!("Using custom cognito endpoint: {}", cfg.cognito.endpoint);
        }
        dispatcher.register(COGNITO_MODULE, Arc::new(cognito));

        info!("Registered authentication modules: {:?}", dispatcher.modules());
        if !dispatcher.modules().contains(&cfg.default_module.as_str()) {
            warn!(
                "Default module '{}' has no verifier, password logins without a module will fail",
                cfg.default_module
            );
        }
        Ok(dispatcher)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CommonConfig;

    use super::*;

    #[test]
    fn test_factory() {
        let factory = AuthnFactory::new();
        let cfg = AuthnConfig::default();
        let dispatcher = factory.build_dispatcher(&cfg).unwrap();
        assert_eq!(dispatcher.modules(), vec!["cognito"]);
    }
}
