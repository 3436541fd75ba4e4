use anyhow::{bail, Result};
use async_trait::async_trait;
use clap::{Args, ValueEnum};
use log::info;

use transfer_idp::directory::factory::DirectoryFactory;
use transfer_idp::directory::Directory;

use super::{ConfigArgs, RunCommand};

/// Delete a user or identity provider record from the directory.
#[derive(Args)]
pub struct DeleteArgs {
    /// The record type to delete.
    pub resource: ResourceType,

    /// User name or provider key.
    pub name: String,

    /// For users, the identity provider the record is scoped to. Omit to
    /// delete the unscoped record.
    #[arg(long)]
    pub provider: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ResourceType {
    User,
    Provider,
}

#[async_trait]
impl RunCommand for DeleteArgs {
    async fn run(&self) -> Result<()> {
        let cfg = self.config.load()?;
        let db = DirectoryFactory::new().build_directory(&cfg.directory)?;

        delete_record(&db, self.resource, &self.name, self.provider.as_deref())?;
        info!("Deleted {:?} record '{}'", self.resource, self.name);
        Ok(())
    }
}

fn delete_record(
    db: &Directory,
    resource: ResourceType,
    name: &str,
    provider: Option<&str>,
) -> Result<()> {
    let deleted = match resource {
        ResourceType::User => db.with_transaction(|tx| tx.delete_user(name, provider))?,
        ResourceType::Provider => {
            if provider.is_some() {
                bail!("--provider only applies to user records");
            }
            db.with_transaction(|tx| tx.delete_provider(name))?
        }
    };

    if !deleted {
        bail!("{resource:?} record '{name}' not found");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use transfer_idp::directory::config::DirectoryConfig;
    use transfer_idp::types::record::{ConfigBlock, IdentityProviderRecord, UserRecord};

    use super::*;

    #[test]
    fn test_delete_record() {
        let db = DirectoryFactory::new()
            .build_directory(&DirectoryConfig::memory())
            .unwrap();
        db.with_transaction(|tx| {
            tx.put_user(&UserRecord {
                user: "alice".to_string(),
                identity_provider_key: Some("corp".to_string()),
                ipv4_allow_list: vec![],
                config: ConfigBlock::default(),
            })?;
            tx.put_provider(&IdentityProviderRecord {
                provider: "corp".to_string(),
                disabled: false,
                ipv4_allow_list: vec![],
                module: None,
                module_config: Default::default(),
                config: ConfigBlock::default(),
            })
        })
        .unwrap();

        assert!(delete_record(&db, ResourceType::User, "alice", None).is_err());
        delete_record(&db, ResourceType::User, "alice", Some("corp")).unwrap();
        assert!(delete_record(&db, ResourceType::User, "alice", Some("corp")).is_err());

        assert!(delete_record(&db, ResourceType::Provider, "corp", Some("x")).is_err());
        delete_record(&db, ResourceType::Provider, "corp", None).unwrap();
        let providers = db.with_transaction(|tx| tx.list_providers()).unwrap();
        assert!(providers.is_empty());
    }
}
