use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::Args;
use log::info;
use serde::de::DeserializeOwned;

use transfer_idp::directory::factory::DirectoryFactory;
use transfer_idp::types::record::{IdentityProviderRecord, UserRecord};

use super::{ConfigArgs, RunCommand};

/// Load user and identity provider records into the directory.
#[derive(Args)]
pub struct ImportArgs {
    /// JSON file holding an array of user records.
    #[arg(long)]
    pub users: Option<PathBuf>,

    /// JSON file holding an array of identity provider records.
    #[arg(long)]
    pub providers: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[async_trait]
impl RunCommand for ImportArgs {
    async fn run(&self) -> Result<()> {
        if self.users.is_none() && self.providers.is_none() {
            bail!("nothing to import, please specify --users or --providers");
        }

        let cfg = self.config.load()?;

        let users: Vec<UserRecord> = match self.users.as_ref() {
            Some(path) => read_records(path)?,
            None => Vec::new(),
        };
        let providers: Vec<IdentityProviderRecord> = match self.providers.as_ref() {
            Some(path) => read_records(path)?,
            None => Vec::new(),
        };

        let db = DirectoryFactory::new().build_directory(&cfg.directory)?;
        db.with_transaction(|tx| {
            for provider in providers.iter() {
                tx.put_provider(provider)
                    .with_context(|| format!("put provider '{}'", provider.provider))?;
            }
            for user in users.iter() {
                tx.put_user(user)
                    .with_context(|| format!("put user '{}'", user.user))?;
            }
            Ok(())
        })?;

        info!(
            "Imported {} user record(s) and {} identity provider record(s)",
            users.len(),
            providers.len()
        );
        Ok(())
    }
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read file: {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parse records: {}", path.display()))
}
