use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{CommonConfig, PathSet};

use super::cognito::config::CognitoConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthnConfig {
    /// Module used for providers whose record declares none.
    #[serde(default = "AuthnConfig::default_module")]
    pub default_module: String,

    #[serde(default = "CognitoConfig::default")]
    pub cognito: CognitoConfig,
}

impl CommonConfig for AuthnConfig {
    fn default() -> Self {
        Self {
            default_module: Self::default_module(),
            cognito: CognitoConfig::default(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        if self.default_module.is_empty() {
            bail!("default_module cannot be empty");
        }
        self.cognito.complete(ps).context("cognito")?;
        Ok(())
    }
}

impl AuthnConfig {
    pub fn default_module() -> String {
        String::from(super::factory::COGNITO_MODULE)
    }
}
