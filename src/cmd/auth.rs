use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use log::error;

use transfer_idp::resolver::factory::ResolverFactory;
use transfer_idp::types::request::AuthRequest;
use transfer_idp::types::response::AuthResponse;

use super::{ConfigArgs, RunCommand};

/// Resolve one authentication request and print the response JSON.
#[derive(Args)]
pub struct AuthArgs {
    /// Read the request from this file instead of stdin.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[async_trait]
impl RunCommand for AuthArgs {
    async fn run(&self) -> Result<()> {
        let cfg = self.config.load()?;
        let resolver = ResolverFactory::new().build_resolver(&cfg)?;

        let data = match self.file.as_ref() {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("read request file: {}", path.display()))?,
            None => {
                let mut data = String::new();
                io::stdin()
                    .read_to_string(&mut data)
                    .context("read request from stdin")?;
                data
            }
        };

        let resp = match serde_json::from_str::<AuthRequest>(&data) {
            Ok(req) => resolver.handle(&req).await,
            Err(err) => {
                error!("Decode request failed: {err}");
                AuthResponse::empty()
            }
        };

        println!("{}", serde_json::to_string(&resp)?);
        Ok(())
    }
}
