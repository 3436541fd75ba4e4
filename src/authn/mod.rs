pub mod cognito;
pub mod config;
pub mod factory;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use serde_json::{Map, Value};

use crate::resolver::error::ResolveError;
use crate::types::record::IdentityProviderRecord;
use crate::types::request::LoginRequest;
use crate::types::response::SessionDescriptor;

/// Outcome of a credential check. `Err` from a verifier is reserved for the
/// verifier itself failing (network, misconfiguration).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(String),
}

/// Checks a username and secret against one kind of identity backend.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(
        &self,
        username: &str,
        secret: &str,
        params: &Map<String, Value>,
    ) -> Result<Verdict>;
}

/// Selects the authentication path for a request and the verifier for the
/// provider's declared module.
pub struct AuthDispatcher {
    verifiers: HashMap<String, Arc<dyn CredentialVerifier>>,
    default_module: String,
}

impl AuthDispatcher {
    pub fn new(default_module: impl Into<String>) -> Self {
        Self {
            verifiers: HashMap::new(),
            default_module: default_module.into(),
        }
    }

    pub fn register(&mut self, module: impl Into<String>, verifier: Arc<dyn CredentialVerifier>) {
        self.verifiers.insert(module.into(), verifier);
    }

    pub fn modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = self.verifiers.keys().map(String::as_str).collect();
        modules.sort();
        modules
    }

    /// Authenticates `username` and hands back the already merged descriptor
    /// untouched on success.
    pub async fn authenticate(
        &self,
        req: &LoginRequest,
        username: &str,
        provider: &IdentityProviderRecord,
        desc: SessionDescriptor,
    ) -> Result<SessionDescriptor, ResolveError> {
        let secret = match req.secret.as_deref() {
            Some(secret) => secret,
            None => {
                info!("No password provided, performing public key auth");
                return Err(ResolveError::UnsupportedAuthMethod {
                    method: String::from("publickey"),
                });
            }
        };

        let module = provider
            .module
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_module);
        info!("Password provided, performing password auth with module '{module}'");

        let verifier = match self.verifiers.get(module) {
            Some(verifier) => verifier,
            None => {
                return Err(ResolveError::UnsupportedAuthMethod {
                    method: module.to_string(),
                })
            }
        };

        let verdict = verifier
            .verify(username, secret, &provider.module_config)
            .await
            .map_err(ResolveError::Verifier)?;
        match verdict {
            Verdict::Accepted => {
                info!("User '{username}' authenticated by module '{module}'");
                Ok(desc)
            }
            Verdict::Rejected(reason) => {
                warn!("Module '{module}' rejected user '{username}': {reason}");
                Err(ResolveError::AuthenticationFailed { reason })
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use std::sync::Mutex;

    use anyhow::bail;

    use crate::types::record::ConfigBlock;
    use crate::types::request::AuthRequest;

    use super::*;

    /// Accepts exactly one password, records what it was asked.
    pub struct StaticVerifier {
        password: String,
        pub calls: Mutex<Vec<(String, Map<String, Value>)>>,
    }

    impl StaticVerifier {
        pub fn new(password: &str) -> Self {
            Self {
                password: password.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CredentialVerifier for StaticVerifier {
        async fn verify(
            &self,
            username: &str,
            secret: &str,
            params: &Map<String, Value>,
        ) -> Result<Verdict> {
            self.calls
                .lock()
                .unwrap()
                .push((username.to_string(), params.clone()));
            if secret == self.password {
                Ok(Verdict::Accepted)
            } else {
                Ok(Verdict::Rejected(String::from("wrong password")))
            }
        }
    }

    struct BrokenVerifier;

    #[async_trait]
    impl CredentialVerifier for BrokenVerifier {
        async fn verify(&self, _: &str, _: &str, _: &Map<String, Value>) -> Result<Verdict> {
            bail!("connection refused")
        }
    }

    fn login(password: Option<&str>) -> LoginRequest {
        LoginRequest::from_request(&AuthRequest {
            username: Some("alice".to_string()),
            password: password.map(String::from),
            server_id: Some("s-1".to_string()),
            source_ip: Some("10.0.0.1".to_string()),
            protocol: None,
        })
        .unwrap()
    }

    fn provider(module: Option<&str>) -> IdentityProviderRecord {
        IdentityProviderRecord {
            provider: "corp".to_string(),
            disabled: false,
            ipv4_allow_list: vec![],
            module: module.map(String::from),
            module_config: Default::default(),
            config: ConfigBlock::default(),
        }
    }

    fn desc() -> SessionDescriptor {
        SessionDescriptor {
            role: Some("R1".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_public_key_path_unsupported() {
        let mut dispatcher = AuthDispatcher::new("cognito");
        dispatcher.register("cognito", Arc::new(StaticVerifier::new("pw")));

        for password in [None, Some(""), Some("   ")] {
            let err = dispatcher
                .authenticate(&login(password), "alice", &provider(None), desc())
                .await
                .unwrap_err();
            assert!(
                matches!(err, ResolveError::UnsupportedAuthMethod { ref method } if method == "publickey")
            );
        }
    }

    #[tokio::test]
    async fn test_password_path() {
        let verifier = Arc::new(StaticVerifier::new("pw"));
        let mut dispatcher = AuthDispatcher::new("cognito");
        dispatcher.register("cognito", verifier.clone());

        let ret = dispatcher
            .authenticate(&login(Some("pw")), "alice", &provider(Some("cognito")), desc())
            .await
            .unwrap();
        assert_eq!(ret, desc());

        let err = dispatcher
            .authenticate(&login(Some("bad")), "alice", &provider(Some("cognito")), desc())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::AuthenticationFailed { .. }));

        let calls = verifier.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "alice");
    }

    #[tokio::test]
    async fn test_default_module() {
        let verifier = Arc::new(StaticVerifier::new("pw"));
        let mut dispatcher = AuthDispatcher::new("local");
        dispatcher.register("local", verifier.clone());

        dispatcher
            .authenticate(&login(Some("pw")), "alice", &provider(None), desc())
            .await
            .unwrap();
        dispatcher
            .authenticate(&login(Some("pw")), "alice", &provider(Some("")), desc())
            .await
            .unwrap();
        assert_eq!(verifier.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_module() {
        let mut dispatcher = AuthDispatcher::new("cognito");
        dispatcher.register("cognito", Arc::new(StaticVerifier::new("pw")));
        assert_eq!(dispatcher.modules(), vec!["cognito"]);

        let err = dispatcher
            .authenticate(&login(Some("pw")), "alice", &provider(Some("ldap")), desc())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedAuthMethod { method } if method == "ldap"));
    }

    #[tokio::test]
    async fn test_verifier_failure() {
        let mut dispatcher = AuthDispatcher::new("cognito");
        dispatcher.register("cognito", Arc::new(BrokenVerifier));

        let err = dispatcher
            .authenticate(&login(Some("pw")), "alice", &provider(None), desc())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Verifier(_)));
    }
}
