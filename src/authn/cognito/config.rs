use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CognitoConfig {
    /// Overrides the regional `cognito-idp` endpoint, mostly for testing.
    #[serde(default = "CognitoConfig::default_endpoint")]
    pub endpoint: String,

    #[serde(default = "CognitoConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl CommonConfig for CognitoConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }

    fn complete(&mut self, _ps: &PathSet) -> Result<()> {
        self.endpoint = expandenv("endpoint", &self.endpoint)?;

        if self.timeout_secs < Self::MIN_TIMEOUT_SECS {
            bail!(
                "timeout_secs must be greater than or equal to {}",
                Self::MIN_TIMEOUT_SECS
            );
        }
        if self.timeout_secs > Self::MAX_TIMEOUT_SECS {
            bail!(
                "timeout_secs must be less than or equal to {}",
                Self::MAX_TIMEOUT_SECS
            );
        }

        Ok(())
    }
}

impl CognitoConfig {
    const MAX_TIMEOUT_SECS: u64 = 60;
    const MIN_TIMEOUT_SECS: u64 = 1;

    pub fn default_endpoint() -> String {
        String::new()
    }

    pub fn default_timeout_secs() -> u64 {
        10
    }
}
