use crate::Lovelace;

/// Fee, size and deposit constants of one epoch.
///
/// A snapshot: parameters are fetched once per build and never change during it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProtocolParameters {
    /// Epoch these parameters were read for
    pub epoch: u64,

    /// Fee per byte of serialized transaction
    pub min_fee_a: u64,

    /// Constant fee per transaction
    pub min_fee_b: u64,

    /// Minimum lovelace of an output holding no native assets
    pub min_utxo_value: Lovelace,

    pub pool_deposit: Lovelace,
    pub key_deposit: Lovelace,

    /// Lovelace per 8-byte word of output size, for outputs carrying native assets
    pub coins_per_utxo_word: Lovelace,

    /// Maximum encoded size of one output value, in bytes
    pub max_value_size: u64,

    /// Maximum encoded size of a whole transaction, in bytes
    pub max_tx_size: u64,
}

impl ProtocolParameters {
    /// Linear fee for a transaction of `size` bytes, `None` on overflow
    pub fn min_fee(&self, size: u64) -> Option<Lovelace> {
        self.min_fee_a.checked_mul(size)?.checked_add(self.min_fee_b)
    }
}

impl Default for ProtocolParameters {
    /// Mainnet values of the Mary/Alonzo era
    fn default() -> Self {
        Self {
            epoch: 0,
            min_fee_a: 44,
            min_fee_b: 155_381,
            min_utxo_value: 1_000_000,
            pool_deposit: 500_000_000,
            key_deposit: 2_000_000,
            coins_per_utxo_word: 34_482,
            max_value_size: 5000,
            max_tx_size: 16384,
        }
    }
}
