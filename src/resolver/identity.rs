use std::sync::Arc;

use log::{debug, info};

use crate::directory::Directory;
use crate::types::record::{IdentityProviderRecord, UserRecord};

use super::error::ResolveError;

/// Looks up user and identity provider records for one request.
pub struct IdentityResolver {
    db: Arc<Directory>,
    default_user: String,
}

impl IdentityResolver {
    pub fn new(db: Arc<Directory>, default_user: String) -> Self {
        Self { db, default_user }
    }

    /// Finds the user record, falling back in a fixed order:
    ///
    /// 1. the record scoped to `provider_hint`, when a hint was given;
    /// 2. the first record of `username` under any provider;
    /// 3. the first record of the default user.
    pub fn resolve_user(
        &self,
        username: &str,
        provider_hint: Option<&str>,
    ) -> Result<UserRecord, ResolveError> {
        let found = self
            .db
            .with_transaction(|tx| {
                if let Some(provider) = provider_hint {
                    if let Some(record) = tx.get_user(username, provider)? {
                        return Ok(Some(record));
                    }
                    debug!("No record for user '{username}' under provider '{provider}'");
                }

                let mut records = tx.query_users(username)?;
                if !records.is_empty() {
                    return Ok(Some(records.swap_remove(0)));
                }

                info!(
                    "Record for user '{username}' identity provider {provider_hint:?} not found, retrieving default user record"
                );
                let mut records = tx.query_users(&self.default_user)?;
                if !records.is_empty() {
                    return Ok(Some(records.swap_remove(0)));
                }
                Ok(None)
            })
            .map_err(ResolveError::Directory)?;

        match found {
            Some(record) => {
                info!(
                    "Using user record '{}' with identity provider '{}'",
                    record.user,
                    record.provider_key()
                );
                Ok(record)
            }
            None => Err(ResolveError::UserNotFound {
                user: username.to_string(),
            }),
        }
    }

    /// Fetches the provider record named `key` and rejects disabled ones.
    pub fn resolve_provider(&self, key: &str) -> Result<IdentityProviderRecord, ResolveError> {
        info!("Fetching identity provider record for '{key}'");
        let record = self
            .db
            .with_transaction(|tx| tx.get_provider(key))
            .map_err(ResolveError::Directory)?;

        let record = match record {
            Some(record) => record,
            None => {
                return Err(ResolveError::ProviderNotFound {
                    provider: key.to_string(),
                })
            }
        };

        if record.disabled {
            return Err(ResolveError::ProviderDisabled {
                provider: key.to_string(),
            });
        }

        Ok(record)
    }
}
