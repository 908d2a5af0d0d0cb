//! Bounded wait for a submitted transaction to reach a block

use std::time::Duration;

use horrocard_common::TxHash;
use tracing::{debug, info, warn};

use crate::{ChainIndexer, IndexerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Seen on chain at the given attempt (1-based)
    Confirmed { attempt: u32 },

    /// Still not seen after every attempt; the transaction may yet be included
    Unconfirmed,
}

/// Poll `transaction_status` up to `policy.attempts` times, sleeping
/// `policy.interval` between tries. Indexer errors end the wait.
pub async fn await_confirmation(
    indexer: &dyn ChainIndexer,
    hash: &TxHash,
    policy: ConfirmationPolicy,
) -> Result<Confirmation, IndexerError> {
    for attempt in 1..=policy.attempts {
        if indexer.transaction_status(hash).await? {
            info!("Transaction {hash} confirmed after {attempt} attempt(s)");
            return Ok(Confirmation::Confirmed { attempt });
        }
        debug!("Transaction {hash} not yet on chain (attempt {attempt}/{})", policy.attempts);
        if attempt < policy.attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    warn!("Transaction {hash} unconfirmed after {} attempts", policy.attempts);
    Ok(Confirmation::Unconfirmed)
}
