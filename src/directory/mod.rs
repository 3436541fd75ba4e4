mod sqlite;

#[cfg(test)]
pub mod tests;

pub mod config;
pub mod factory;

use std::sync::Mutex;

use anyhow::{bail, Result};
use sqlite::{Sqlite, SqliteTransaction};

use crate::types::record::{IdentityProviderRecord, UserRecord};

/// Directory connection that can create transactions
pub trait Connection<'a, T>
where
    T: Transaction + 'a,
{
    fn transaction(&'a mut self) -> Result<T>;
}

/// Query and maintenance operations on user and identity provider records.
pub trait Transaction {
    // User operations
    /// Creates or replaces the record keyed by `(user, identity_provider_key)`
    fn put_user(&self, user: &UserRecord) -> Result<()>;
    /// Point lookup by the composite key
    fn get_user(&self, user: &str, provider: &str) -> Result<Option<UserRecord>>;
    /// All records of a user across providers, in insertion order
    fn query_users(&self, user: &str) -> Result<Vec<UserRecord>>;
    /// Deletes one record, returns whether it existed
    fn delete_user(&self, user: &str, provider: Option<&str>) -> Result<bool>;

    // Identity provider operations
    fn put_provider(&self, provider: &IdentityProviderRecord) -> Result<()>;
    fn get_provider(&self, key: &str) -> Result<Option<IdentityProviderRecord>>;
    fn list_providers(&self) -> Result<Vec<IdentityProviderRecord>>;
    fn delete_provider(&self, key: &str) -> Result<bool>;

    fn commit(self) -> Result<()>;
    fn rollback(self) -> Result<()>;
}

/// The directory store, shared between concurrent requests.
pub struct Directory {
    conn: Mutex<UnionConnection>,
}

pub enum UnionConnection {
    Sqlite(Sqlite),
}

enum UnionTransaction<'a> {
    Sqlite(SqliteTransaction<'a>),
}

impl Directory {
    pub fn new(conn: UnionConnection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Runs `f` inside one transaction. The transaction is committed when `f`
    /// succeeds and rolled back otherwise.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Transaction) -> Result<T>,
    {
        let mut conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(e) => bail!("failed to lock directory: {e:#}"),
        };
        let tx = conn.transaction()?;

        let result = f(&tx);

        if result.is_ok() {
            tx.commit()
        } else {
            tx.rollback()
        }?;

        result
    }

    #[cfg(test)]
    pub fn new_test() -> Self {
        Self::new(UnionConnection::Sqlite(Sqlite::memory().unwrap()))
    }
}

impl<'a> Connection<'a, UnionTransaction<'a>> for UnionConnection {
    fn transaction(&'a mut self) -> Result<UnionTransaction<'a>> {
        match self {
            UnionConnection::Sqlite(sqlite) => sqlite.transaction().map(UnionTransaction::Sqlite),
        }
    }
}

impl Transaction for UnionTransaction<'_> {
    fn put_user(&self, user: &UserRecord) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.put_user(user),
        }
    }

    fn get_user(&self, user: &str, provider: &str) -> Result<Option<UserRecord>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_user(user, provider),
        }
    }

    fn query_users(&self, user: &str) -> Result<Vec<UserRecord>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.query_users(user),
        }
    }

    fn delete_user(&self, user: &str, provider: Option<&str>) -> Result<bool> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.delete_user(user, provider),
        }
    }

    fn put_provider(&self, provider: &IdentityProviderRecord) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.put_provider(provider),
        }
    }

    fn get_provider(&self, key: &str) -> Result<Option<IdentityProviderRecord>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_provider(key),
        }
    }

    fn list_providers(&self) -> Result<Vec<IdentityProviderRecord>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.list_providers(),
        }
    }

    fn delete_provider(&self, key: &str) -> Result<bool> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.delete_provider(key),
        }
    }

    fn commit(self) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.commit(),
        }
    }

    fn rollback(self) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.rollback(),
        }
    }
}

#[cfg(test)]
mod directory_tests {
    use super::*;

    #[test]
    fn test_sqlite_directory() {
        let db = Directory::new_test();
        tests::run_all_tests(&db);
    }

    #[test]
    fn test_rollback_on_error() {
        let db = Directory::new_test();
        let result: Result<()> = db.with_transaction(|tx| {
            tx.put_user(&UserRecord {
                user: "ghost".to_string(),
                identity_provider_key: None,
                ipv4_allow_list: vec![],
                config: Default::default(),
            })?;
            bail!("abort");
        });
        assert!(result.is_err());

        let users = db.with_transaction(|tx| tx.query_users("ghost")).unwrap();
        assert!(users.is_empty());
    }
}
