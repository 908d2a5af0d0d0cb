//! Wallet settings: a TOML file overlaid with `HORROCARD_*` environment variables

use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Case, Config, Environment, File};
use horrocard_common::{Address, NetworkId};
use horrocard_module_indexer::IndexerConfig;

// Configuration defaults
const DEFAULT_NETWORK: (&str, &str) = ("network", "mainnet");
const DEFAULT_KEY_FILE: (&str, &str) = ("key-file", "payment.skey");
const DEFAULT_TTL_OFFSET: (&str, i64) = ("ttl-offset", 7200);
const DEFAULT_MIN_INPUT_COUNT: (&str, i64) = ("min-input-count", 2);
const ADDRESS_KEY: &str = "address";

#[derive(Debug, Clone)]
pub struct WalletConfig {
    pub network: NetworkId,

    /// Spending and change address
    pub address: Address,

    pub key_file: PathBuf,

    /// Slots past the tip a new transaction stays valid for
    pub ttl_offset: u64,

    pub min_input_count: usize,

    pub indexer: IndexerConfig,
}

impl WalletConfig {
    /// Read the given files in order, then the environment
    pub fn load(files: &[String]) -> Result<Self> {
        let mut builder = Config::builder();
        for file in files {
            builder = builder.add_source(File::with_name(file));
        }
        let config = builder
            .add_source(Environment::with_prefix("HORROCARD").convert_case(Case::Kebab))
            .build()
            .context("Reading wallet configuration")?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let network: NetworkId = config
            .get_string(DEFAULT_NETWORK.0)
            .unwrap_or(DEFAULT_NETWORK.1.to_string())
            .parse()?;

        let address = config
            .get_string(ADDRESS_KEY)
            .context("No wallet address configured")?;
        let address = Address::parse_for(&address, network)
            .with_context(|| format!("Wallet address {address}"))?;

        let key_file = config
            .get_string(DEFAULT_KEY_FILE.0)
            .unwrap_or(DEFAULT_KEY_FILE.1.to_string())
            .into();

        let ttl_offset = config.get_int(DEFAULT_TTL_OFFSET.0).unwrap_or(DEFAULT_TTL_OFFSET.1);
        let min_input_count =
            config.get_int(DEFAULT_MIN_INPUT_COUNT.0).unwrap_or(DEFAULT_MIN_INPUT_COUNT.1);

        Ok(Self {
            network,
            address,
            key_file,
            ttl_offset: u64::try_from(ttl_offset).context("ttl-offset must not be negative")?,
            min_input_count: usize::try_from(min_input_count)
                .context("min-input-count must not be negative")?,
            indexer: IndexerConfig::try_load(config)?,
        })
    }
}
