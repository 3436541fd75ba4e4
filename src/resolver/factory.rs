use anyhow::{Context, Result};

use crate::authn::factory::AuthnFactory;
use crate::directory::factory::DirectoryFactory;

use super::config::ResolverConfig;
use super::Resolver;

pub struct ResolverFactory;

impl ResolverFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn build_resolver(&self, cfg: &ResolverConfig) -> Result<Resolver> {
        let db = DirectoryFactory::new()
            .build_directory(&cfg.directory)
            .context("init directory")?;
        let dispatcher = AuthnFactory::new()
            .build_dispatcher(&cfg.authn)
            .context("init authentication")?;
        Ok(Resolver::new(db, dispatcher, cfg))
    }
}
