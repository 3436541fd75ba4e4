mod provider;
mod user;

pub mod config;
pub mod factory;

use std::path::Path;

use anyhow::Result;
use rusqlite::Connection as RawConnection;
use rusqlite::Transaction as RawTransaction;

use crate::types::record::{IdentityProviderRecord, UserRecord};

use super::{Connection, Transaction};

/// SQLite-backed directory. Supports both file-based and in-memory databases.
pub struct Sqlite {
    conn: RawConnection,
}

pub struct SqliteTransaction<'a> {
    tx: RawTransaction<'a>,
}

impl Sqlite {
    /// Opens a SQLite database file, creating it and its tables if needed.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = RawConnection::open(path)?;
        Self::init_tables(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory database, content is lost when the process exits.
    pub fn memory() -> Result<Self> {
        let conn = RawConnection::open_in_memory()?;
        Self::init_tables(&conn)?;
        Ok(Self { conn })
    }

    fn init_tables(db: &RawConnection) -> Result<()> {
        user::create_user_tables(db)?;
        provider::create_provider_tables(db)?;
        Ok(())
    }
}

impl<'a> Connection<'a, SqliteTransaction<'a>> for Sqlite {
    fn transaction(&'a mut self) -> Result<SqliteTransaction<'a>> {
        let tx = self.conn.transaction()?;
        Ok(SqliteTransaction { tx })
    }
}

impl Transaction for SqliteTransaction<'_> {
    fn put_user(&self, user: &UserRecord) -> Result<()> {
        user::put_user(&self.tx, user)
    }

    fn get_user(&self, user: &str, provider: &str) -> Result<Option<UserRecord>> {
        user::get_user(&self.tx, user, provider)
    }

    fn query_users(&self, user: &str) -> Result<Vec<UserRecord>> {
        user::query_users(&self.tx, user)
    }

    fn delete_user(&self, user: &str, provider: Option<&str>) -> Result<bool> {
        user::delete_user(&self.tx, user, provider)
    }

    fn put_provider(&self, provider: &IdentityProviderRecord) -> Result<()> {
        provider::put_provider(&self.tx, provider)
    }

    fn get_provider(&self, key: &str) -> Result<Option<IdentityProviderRecord>> {
        provider::get_provider(&self.tx, key)
    }

    fn list_providers(&self) -> Result<Vec<IdentityProviderRecord>> {
        provider::list_providers(&self.tx)
    }

    fn delete_provider(&self, key: &str) -> Result<bool> {
        provider::delete_provider(&self.tx, key)
    }

    fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}
