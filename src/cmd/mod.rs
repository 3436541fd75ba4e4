mod auth;
mod delete;
mod import;
mod list;
mod parse;

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};

use transfer_idp::config::{CommonConfig, PathSet};
use transfer_idp::logs;
use transfer_idp::resolver::config::ResolverConfig;

#[derive(Parser)]
#[command(author, version, about)]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Auth(auth::AuthArgs),
    Delete(delete::DeleteArgs),
    Import(import::ImportArgs),
    List(list::ListArgs),
    Parse(parse::ParseArgs),
}

#[async_trait]
pub trait RunCommand {
    async fn run(&self) -> Result<()>;
}

#[async_trait]
impl RunCommand for App {
    async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Auth(args) => args.run().await,
            Commands::Delete(args) => args.run().await,
            Commands::Import(args) => args.run().await,
            Commands::List(args) => args.run().await,
            Commands::Parse(args) => args.run().await,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// The config directory, default is `~/.config/transfer-idp`.
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// The data directory, default is `~/.local/share/transfer-idp`.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Override the log level in the config file.
    #[arg(long)]
    pub log_level: Option<String>,
}

impl ConfigArgs {
    pub fn build_path_set(&self) -> Result<PathSet> {
        PathSet::new(self.config_dir.clone(), self.data_dir.clone())
    }

    /// Loads `idp.toml` and sets up logging from it.
    pub fn load(&self) -> Result<ResolverConfig> {
        let ps = self.build_path_set()?;
        let mut cfg: ResolverConfig = ps.load_config("idp", ResolverConfig::default)?;
        if let Some(level) = self.log_level.as_ref() {
            logs::parse_level(level)?;
            cfg.log.level = level.clone();
        }

        logs::init(&cfg.log.level)?;
        Ok(cfg)
    }
}
