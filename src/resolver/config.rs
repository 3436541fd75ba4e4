use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::authn::config::AuthnConfig;
use crate::config::{expandenv, CommonConfig, PathSet};
use crate::directory::config::DirectoryConfig;
use crate::types::record::DEFAULT_PROVIDER_KEY;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ResolverConfig {
    /// Separates username and provider in a login name, e.g. `alice@@corp`.
    #[serde(default = "ResolverConfig::default_user_name_delimiter")]
    pub user_name_delimiter: String,

    /// User whose record serves logins that match no record of their own.
    #[serde(default = "ResolverConfig::default_user")]
    pub default_user: String,

    /// Provider key for user records that name none.
    #[serde(default = "ResolverConfig::default_provider")]
    pub default_provider: String,

    #[serde(default = "LogConfig::default")]
    pub log: LogConfig,

    #[serde(default = "DirectoryConfig::default")]
    pub directory: DirectoryConfig,

    #[serde(default = "AuthnConfig::default")]
    pub authn: AuthnConfig,
}

impl CommonConfig for ResolverConfig {
    fn default() -> Self {
        Self {
            user_name_delimiter: Self::default_user_name_delimiter(),
            default_user: Self::default_user(),
            default_provider: Self::default_provider(),
            log: LogConfig::default(),
            directory: DirectoryConfig::default(),
            authn: AuthnConfig::default(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        self.user_name_delimiter = expandenv("user_name_delimiter", &self.user_name_delimiter)?;
        if self.user_name_delimiter.is_empty() {
            bail!("user_name_delimiter cannot be empty");
        }

        self.default_user = expandenv("default_user", &self.default_user)?;
        if self.default_user.is_empty() {
            bail!("default_user cannot be empty");
        }

        self.default_provider = expandenv("default_provider", &self.default_provider)?;
        if self.default_provider.is_empty() {
            bail!("default_provider cannot be empty");
        }

        self.log.complete(ps).context("log")?;

        self.directory.complete(ps).context("directory")?;
        self.authn.complete(ps).context("authn")?;
        Ok(())
    }
}

impl ResolverConfig {
    pub fn default_user_name_delimiter() -> String {
        String::from("@@")
    }

    pub fn default_user() -> String {
        String::from("user1")
    }

    pub fn default_provider() -> String {
        String::from(DEFAULT_PROVIDER_KEY)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_level")]
    pub level: String,
}

impl CommonConfig for LogConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }

    fn complete(&mut self, _ps: &PathSet) -> Result<()> {
        crate::logs::parse_level(&self.level)?;
        Ok(())
    }
}

impl LogConfig {
    fn default_level() -> String {
        String::from("info")
    }
}

#[cfg(test)]
mod tests {
    use crate::config::tests::temp_path_set;

    use super::*;

    #[test]
    fn test_defaults() {
        let ps = temp_path_set();
        let cfg: ResolverConfig = ps.load_config("idp", ResolverConfig::default).unwrap();
        assert_eq!(cfg.user_name_delimiter, "@@");
        assert_eq!(cfg.default_user, "user1");
        assert_eq!(cfg.default_provider, "$default$");
        assert_eq!(cfg.log.level, "info");
        assert_eq!(cfg.authn.default_module, "cognito");
        assert_eq!(cfg.authn.cognito.timeout_secs, 10);
        assert!(cfg.directory.sqlite.path.ends_with("directory.db"));
    }

    #[test]
    fn test_load_toml() {
        let ps = temp_path_set();
        std::fs::write(
            ps.config_path.join("idp.toml"),
            r#"
user_name_delimiter = "_"
default_user = "shared"

[log]
level = "debug"

[directory.sqlite]
memory = true

[authn]
default_module = "cognito"

[authn.cognito]
endpoint = "http://127.0.0.1:9229/"
timeout_secs = 3
"#,
        )
        .unwrap();

        let cfg: ResolverConfig = ps.load_config("idp", ResolverConfig::default).unwrap();
        assert_eq!(cfg.user_name_delimiter, "_");
        assert_eq!(cfg.default_user, "shared");
        assert_eq!(cfg.log.level, "debug");
        assert!(cfg.directory.sqlite.memory);
        assert_eq!(cfg.authn.cognito.endpoint, "http://127.0.0.1:9229/");
        assert_eq!(cfg.authn.cognito.timeout_secs, 3);
    }

    #[test]
    fn test_invalid_config() {
        let ps = temp_path_set();
        let path = ps.config_path.join("idp.toml");

        std::fs::write(&path, "user_name_delimiter = \"\"\n").unwrap();
        assert!(ps
            .load_config::<ResolverConfig, _>("idp", ResolverConfig::default)
            .is_err());

        std::fs::write(&path, "[authn.cognito]\ntimeout_secs = 0\n").unwrap();
        assert!(ps
            .load_config::<ResolverConfig, _>("idp", ResolverConfig::default)
            .is_err());

        std::fs::write(&path, "[log]\nlevel = \"loud\"\n").unwrap();
        assert!(ps
            .load_config::<ResolverConfig, _>("idp", ResolverConfig::default)
            .is_err());
    }
}
