use std::time::Duration;

use anyhow::Result;
use config::Config;

use crate::confirmation::ConfirmationPolicy;

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IndexerConfig {
    pub blockfrost_url: String,
    pub project_id: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub confirmation_attempts: u32,
    pub confirmation_interval_secs: u64,
}

impl IndexerConfig {
    /// Overlay `config` on the built-in defaults
    pub fn try_load(config: &Config) -> Result<Self> {
        let full_config = Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config.default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config.clone())
            .build()?;
        Ok(full_config.try_deserialize()?)
    }

    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy {
            attempts: self.confirmation_attempts,
            interval: Duration::from_secs(self.confirmation_interval_secs),
        }
    }
}
