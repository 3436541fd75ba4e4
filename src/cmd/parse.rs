use anyhow::{bail, Result};
use async_trait::async_trait;
use clap::Args;
use serde::Serialize;

use transfer_idp::resolver::username::{join_username, parse_username, ParsedIdentity};

use super::{ConfigArgs, RunCommand};

/// Show how a login name is split into username and provider hint.
#[derive(Args)]
pub struct ParseArgs {
    /// The raw login name, e.g. `alice@@corp`.
    pub raw: String,

    /// Use this delimiter instead of the configured one.
    #[arg(short, long)]
    pub delimiter: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Debug, Serialize)]
struct ParseOutput {
    #[serde(flatten)]
    identity: ParsedIdentity,

    /// Normalized login name that parses to the same identity.
    login: String,
}

#[async_trait]
impl RunCommand for ParseArgs {
    async fn run(&self) -> Result<()> {
        let cfg = self.config.load()?;
        let delimiter = self.delimiter.as_ref().unwrap_or(&cfg.user_name_delimiter);

        let output = parse_login(&self.raw, delimiter)?;
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

fn parse_login(raw: &str, delimiter: &str) -> Result<ParseOutput> {
    if delimiter.is_empty() {
        bail!("delimiter cannot be empty");
    }

    let identity = parse_username(raw, delimiter);
    let login = join_username(&identity, delimiter);
    Ok(ParseOutput { identity, login })
}
