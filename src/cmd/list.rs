use anyhow::Result;
use async_trait::async_trait;
use clap::Args;

use transfer_idp::directory::factory::DirectoryFactory;

use super::{ConfigArgs, RunCommand};

/// List identity provider records in the directory as JSON.
#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[async_trait]
impl RunCommand for ListArgs {
    async fn run(&self) -> Result<()> {
        let cfg = self.config.load()?;
        let db = DirectoryFactory::new().build_directory(&cfg.directory)?;

        let providers = db.with_transaction(|tx| tx.list_providers())?;
        println!("{}", serde_json::to_string_pretty(&providers)?);
        Ok(())
    }
}
