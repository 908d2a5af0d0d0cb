//! Core type definitions for Horrocard

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Amount of the native coin, in its base unit (10^6 lovelace = 1 ADA)
pub type Lovelace = u64;

pub const LOVELACE_PER_ADA: Lovelace = 1_000_000;

/// Network the wallet operates on. Passed explicitly wherever addresses are parsed
/// or built, and into the indexer adapter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    #[default]
    Mainnet,
    Testnet,
}

impl NetworkId {
    /// Network nibble of a Shelley address header
    pub fn header_bits(&self) -> u8 {
        match self {
            NetworkId::Mainnet => 1,
            NetworkId::Testnet => 0,
        }
    }

    /// Human readable part of payment addresses on this network
    pub fn address_hrp(&self) -> &'static str {
        match self {
            NetworkId::Mainnet => "addr",
            NetworkId::Testnet => "addr_test",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkId::Mainnet => write!(f, "mainnet"),
            NetworkId::Testnet => write!(f, "testnet"),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown network '{0}'")]
pub struct UnknownNetworkError(String);

impl FromStr for NetworkId {
    type Err = UnknownNetworkError;

    /// Accepts the Blockfrost network names as well; every public testnet
    /// shares the testnet address tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(NetworkId::Mainnet),
            "testnet" | "test" | "preprod" | "preview" => Ok(NetworkId::Testnet),
            _ => Err(UnknownNetworkError(s.to_string())),
        }
    }
}

/// Format lovelace as ADA with six decimals, e.g. `1.500000`
pub fn format_ada(lovelace: Lovelace) -> String {
    format!("{}.{:06}", lovelace / LOVELACE_PER_ADA, lovelace % LOVELACE_PER_ADA)
}
