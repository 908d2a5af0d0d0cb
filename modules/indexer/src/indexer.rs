//! Horrocard chain indexer access
//!
//! Reads the state the transaction builder needs (protocol parameters, the
//! UTxO set of an address) and submits the signed result.

use async_trait::async_trait;
use horrocard_common::{Address, Lovelace, ProtocolParameters, TxHash, UnspentOutput};
use serde::Serialize;
use thiserror::Error;

pub mod blockfrost;
pub mod configuration;
pub mod confirmation;

pub use blockfrost::BlockfrostIndexer;
pub use configuration::IndexerConfig;
pub use confirmation::{await_confirmation, Confirmation, ConfirmationPolicy};

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Request to indexer failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Indexer returned HTTP status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected indexer response: {0}")]
    Decode(String),
}

impl IndexerError {
    pub(crate) fn decode(what: &str, err: impl std::fmt::Display) -> Self {
        Self::Decode(format!("{what}: {err}"))
    }
}

/// One transaction touching an address, seen from that address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionSummary {
    pub hash: TxHash,
    pub block_height: u64,

    /// Unix time of the including block, in seconds
    pub block_time: i64,

    /// Lovelace received by the address minus lovelace it spent
    pub net_amount: i64,

    pub fee: Lovelace,
}

/// Read and submit access to the chain
#[async_trait]
pub trait ChainIndexer: Send + Sync {
    /// Parameters of the latest epoch
    async fn protocol_parameters(&self) -> Result<ProtocolParameters, IndexerError>;

    /// Every unspent output locked by `address`; an unused address has none
    async fn utxos(&self, address: &Address) -> Result<Vec<UnspentOutput>, IndexerError>;

    async fn balance(&self, address: &Address) -> Result<Lovelace, IndexerError>;

    /// Most recent first
    async fn transaction_history(
        &self,
        address: &Address,
    ) -> Result<Vec<TransactionSummary>, IndexerError>;

    /// Submit a serialized signed transaction, returning the id the indexer reports
    async fn submit(&self, transaction: &[u8]) -> Result<TxHash, IndexerError>;

    /// True once the transaction is included in a block
    async fn transaction_status(&self, hash: &TxHash) -> Result<bool, IndexerError>;

    /// Slot of the chain tip
    async fn latest_slot(&self) -> Result<u64, IndexerError>;
}
