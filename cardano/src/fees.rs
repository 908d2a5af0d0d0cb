//! Fee and size rules

use horrocard_codec::DecodedTransaction;
use horrocard_common::{Lovelace, ProtocolParameters, UnspentOutput, Value};

use crate::error::TxBuilderError;

/// minFee = (tx_size_in_bytes * min_a) + min_b
pub fn min_fee(params: &ProtocolParameters, size: u64) -> Result<Lovelace, TxBuilderError> {
    params.min_fee(size).ok_or_else(|| TxBuilderError::overflow("fee"))
}

/// Validate a transaction pays at least the fee its own size requires
pub fn validate_fee(
    params: &ProtocolParameters,
    supplied: Lovelace,
    size: u64,
) -> Result<(), TxBuilderError> {
    let required = min_fee(params, size)?;
    if supplied < required {
        return Err(TxBuilderError::InvalidInput(format!(
            "Fee {supplied} is below the minimum {required} for {size} bytes"
        )));
    }
    Ok(())
}

/// Validate the encoded transaction fits the protocol limit; a size equal to
/// the limit is accepted
pub fn validate_tx_size(params: &ProtocolParameters, size: u64) -> Result<(), TxBuilderError> {
    if size > params.max_tx_size {
        return Err(TxBuilderError::MaxSizeExceeded {
            size,
            max: params.max_tx_size,
        });
    }
    Ok(())
}

/// Validate a decoded transaction against the inputs it spends: the fee is
/// present and sufficient, and inputs equal outputs plus fee in every
/// component, so nothing is created or lost
pub fn validate_balance(
    params: &ProtocolParameters,
    decoded: &DecodedTransaction,
    inputs: &[UnspentOutput],
) -> Result<(), TxBuilderError> {
    let fee = decoded
        .fee
        .ok_or_else(|| TxBuilderError::InvalidInput("Transaction has no fee".to_string()))?;
    validate_fee(params, fee, decoded.size)?;

    let consumed = Value::sum(inputs.iter().map(|input| &input.value))
        .ok_or_else(|| TxBuilderError::overflow("input total"))?;
    let produced = Value::sum(decoded.outputs.iter().map(|(_, value)| value))
        .and_then(|total| total.checked_add(&Value::from_lovelace(fee)))
        .ok_or_else(|| TxBuilderError::overflow("output total"))?;

    if consumed != produced {
        return Err(TxBuilderError::InvalidInput(format!(
            "Transaction does not balance: consumes {consumed:?}, produces {produced:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use horrocard_common::{Address, NetworkId, TxHash, UTxOIdentifier};

    fn params() -> ProtocolParameters {
        ProtocolParameters {
            max_tx_size: 300,
            ..Default::default()
        }
    }

    fn decoded(fee: Option<Lovelace>, outputs: Vec<Value>) -> DecodedTransaction {
        let address = Address::enterprise(NetworkId::Testnet, [1; 28].into());
        DecodedTransaction {
            hash: TxHash::default(),
            size: 200,
            fee,
            ttl: None,
            inputs: vec![],
            outputs: outputs.into_iter().map(|v| (address.clone(), v)).collect(),
            vkey_witnesses: vec![],
        }
    }

    fn input(lovelace: Lovelace) -> UnspentOutput {
        UnspentOutput {
            utxo: UTxOIdentifier::new(TxHash::new([9; 32]), 0),
            address: Address::enterprise(NetworkId::Testnet, [1; 28].into()),
            value: Value::from_lovelace(lovelace),
        }
    }

    #[test]
    fn size_at_the_limit_is_accepted() {
        assert!(validate_tx_size(&params(), 300).is_ok());
        assert_eq!(
            validate_tx_size(&params(), 301),
            Err(TxBuilderError::MaxSizeExceeded { size: 301, max: 300 })
        );
    }

    #[test]
    fn fee_below_minimum_is_rejected() {
        let required = 44 * 200 + 155_381;
        assert!(validate_fee(&params(), required, 200).is_ok());
        assert!(validate_fee(&params(), required - 1, 200).is_err());
    }

    #[test]
    fn balanced_transaction_passes() {
        let fee = 200_000;
        let tx = decoded(Some(fee), vec![Value::from_lovelace(3_000_000)]);
        assert!(validate_balance(&params(), &tx, &[input(3_000_000 + fee)]).is_ok());
    }

    #[test]
    fn leaked_lovelace_is_detected() {
        let tx = decoded(Some(200_000), vec![Value::from_lovelace(3_000_000)]);
        assert!(validate_balance(&params(), &tx, &[input(3_500_000)]).is_err());
    }

    #[test]
    fn missing_fee_is_rejected() {
        let tx = decoded(None, vec![Value::from_lovelace(1)]);
        assert!(validate_balance(&params(), &tx, &[input(1)]).is_err());
    }
}
