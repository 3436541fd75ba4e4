use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{CommonConfig, PathSet};

use super::sqlite::config::SqliteConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DirectoryConfig {
    #[serde(default = "DirectoryConfig::default_name")]
    pub name: DirectoryType,

    #[serde(default = "SqliteConfig::default")]
    pub sqlite: SqliteConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub enum DirectoryType {
    #[serde(rename = "sqlite")]
    Sqlite,
}

impl CommonConfig for DirectoryConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            sqlite: SqliteConfig::default(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        self.sqlite.complete(ps).context("sqlite")?;
        Ok(())
    }
}

impl DirectoryConfig {
    fn default_name() -> DirectoryType {
        DirectoryType::Sqlite
    }

    /// In-memory directory, for tests and dry runs.
    pub fn memory() -> Self {
        let mut cfg = <Self as CommonConfig>::default();
        cfg.sqlite.memory = true;
        cfg
    }
}
