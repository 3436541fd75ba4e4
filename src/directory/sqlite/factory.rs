use anyhow::{Context, Result};
use log::{info, warn};

use super::config::SqliteConfig;
use super::Sqlite;

pub struct SqliteFactory;

impl SqliteFactory {
    pub fn new() -> Self {
        Self {}
    }

    pub fn build_sqlite(&self, cfg: &SqliteConfig) -> Result<Sqlite> {
        if cfg.memory {
            warn!("Using in-memory sqlite directory, records will be lost when the process exits");
            return Sqlite::memory();
        }

        info!("Using sqlite directory: {}", cfg.path);
        Sqlite::open(cfg.path.as_ref()).with_context(|| format!("open sqlite '{}'", cfg.path))
    }
}
