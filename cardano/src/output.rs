//! Output Builder: the only way to create a [`TransactionOutput`]

use horrocard_codec::value_size;
use horrocard_common::{Address, Lovelace, ProtocolParameters, Value};

use crate::error::TxBuilderError;

/// Fixed overhead of a UTxO entry in words
const UTXO_ENTRY_OVERHEAD_WORDS: u64 = 27;

/// An output whose coin always covers its minimum ADA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    address: Address,
    value: Value,
}

impl TransactionOutput {
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Minimum lovelace an output holding `value` must carry.
///
/// Lovelace-only values need `min_utxo_value`. Values with native assets
/// need `coins_per_utxo_word * (27 + ceil(encoded_len / 8))`, and never less
/// than `min_utxo_value`.
pub fn min_ada_required(value: &Value, params: &ProtocolParameters) -> Result<Lovelace, TxBuilderError> {
    if value.is_lovelace_only() {
        return Ok(params.min_utxo_value);
    }

    let size = value_size(value).map_err(TxBuilderError::codec)?;
    let words = UTXO_ENTRY_OVERHEAD_WORDS + size.div_ceil(8);
    let required = params
        .coins_per_utxo_word
        .checked_mul(words)
        .ok_or_else(|| TxBuilderError::overflow("minimum ADA"))?;
    Ok(required.max(params.min_utxo_value))
}

/// Return `value` with its coin raised to its own minimum ADA if below it.
///
/// Raising the coin can lengthen its encoding and so the requirement, hence
/// the loop; it settles after a few rounds since the coin encoding is bounded.
pub fn with_min_ada(mut value: Value, params: &ProtocolParameters) -> Result<Value, TxBuilderError> {
    loop {
        let required = min_ada_required(&value, params)?;
        if value.lovelace >= required {
            return Ok(value);
        }
        value.lovelace = required;
    }
}

/// Build an output, raising the coin to the minimum ADA; a larger coin is kept
pub fn build_output(
    address: Address,
    value: Value,
    params: &ProtocolParameters,
) -> Result<TransactionOutput, TxBuilderError> {
    let value = with_min_ada(value, params)?;
    Ok(TransactionOutput { address, value })
}
