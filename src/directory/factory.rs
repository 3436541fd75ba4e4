use std::sync::Arc;

use anyhow::Result;

use super::config::{DirectoryConfig, DirectoryType};
use super::sqlite::factory::SqliteFactory;
use super::{Directory, UnionConnection};

pub struct DirectoryFactory;

impl DirectoryFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn build_directory(&self, cfg: &DirectoryConfig) -> Result<Arc<Directory>> {
        let conn = match cfg.name {
            DirectoryType::Sqlite => {
                let sqlite_factory = SqliteFactory::new();
                let sqlite = sqlite_factory.build_sqlite(&cfg.sqlite)?;
                UnionConnection::Sqlite(sqlite)
            }
        };

        Ok(Arc::new(Directory::new(conn)))
    }
}
