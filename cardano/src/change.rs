//! Change Splitter
//!
//! Change whose encoded value is larger than `max_value_size` is broken into
//! extra outputs, each carrying whole policies and its own minimum ADA.

use horrocard_codec::value_size;
use horrocard_common::{Address, Lovelace, ProtocolParameters, Value};

use crate::{
    error::TxBuilderError,
    output::{TransactionOutput, build_output, min_ada_required, with_min_ada},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSplit {
    pub extra_outputs: Vec<TransactionOutput>,
    /// What stays on the final change output
    pub remainder: Value,
}

fn encoded_size(value: &Value) -> Result<u64, TxBuilderError> {
    value_size(value).map_err(TxBuilderError::codec)
}

/// Greedily take policies in canonical order while the bundle, carrying its
/// minimum ADA, still fits. The bundle is returned with that minimum as coin.
fn next_bundle(remainder: &Value, params: &ProtocolParameters) -> Result<Value, TxBuilderError> {
    let max = params.max_value_size;
    let mut bundle = Value::default();

    for (policy, names) in remainder.assets() {
        let mut candidate = bundle.without_lovelace();
        candidate.insert_policy(*policy, names.clone());
        let candidate = with_min_ada(candidate, params)?;

        if encoded_size(&candidate)? <= max {
            bundle = candidate;
            continue;
        }
        if bundle.is_lovelace_only() {
            // This policy cannot fit in an output on its own
            return Err(TxBuilderError::ChangeTooLarge {
                size: encoded_size(&candidate)?,
                max,
            });
        }
        break;
    }

    if bundle.is_lovelace_only() {
        return Err(TxBuilderError::ChangeTooLarge {
            size: encoded_size(remainder)?,
            max,
        });
    }
    Ok(bundle)
}

/// Asset bundles the change must be split into, each with its minimum ADA as coin
fn plan_bundles(change: &Value, params: &ProtocolParameters) -> Result<Vec<Value>, TxBuilderError> {
    let mut bundles = Vec::new();
    let mut remainder = change.clone();

    while encoded_size(&remainder)? > params.max_value_size {
        let bundle = next_bundle(&remainder, params)?;
        let mut taken = bundle.clone();
        taken.lovelace = taken.lovelace.min(remainder.lovelace);
        remainder = remainder.checked_sub(&taken)?;
        bundles.push(bundle);
    }
    Ok(bundles)
}

/// Lovelace the change needs to pay the minimum ADA of every output it will
/// become: the extra outputs plus the final change output
pub fn change_lovelace_required(
    change: &Value,
    params: &ProtocolParameters,
) -> Result<Lovelace, TxBuilderError> {
    let bundles = plan_bundles(change, params)?;
    let mut leftover = change.clone();
    leftover.lovelace = 0;
    let mut required: Lovelace = 0;
    for bundle in &bundles {
        leftover = leftover.checked_sub(&bundle.without_lovelace())?;
        required = required
            .checked_add(bundle.lovelace)
            .ok_or_else(|| TxBuilderError::overflow("change minimum"))?;
    }
    leftover.lovelace = change.lovelace.saturating_sub(required);
    required
        .checked_add(min_ada_required(&leftover, params)?)
        .ok_or_else(|| TxBuilderError::overflow("change minimum"))
}

/// Split `change` so every resulting value fits `max_value_size`.
///
/// `sum(extra_outputs) + remainder == change` always holds.
pub fn split_change_if_needed(
    change: &Value,
    address: &Address,
    params: &ProtocolParameters,
) -> Result<ChangeSplit, TxBuilderError> {
    let bundles = plan_bundles(change, params)?;

    let needed = bundles.iter().map(|bundle| bundle.lovelace).sum::<Lovelace>();
    if needed > change.lovelace {
        // Not enough coin left to give every extra output its minimum ADA
        return Err(TxBuilderError::ChangeTooLarge {
            size: encoded_size(change)?,
            max: params.max_value_size,
        });
    }

    let mut remainder = change.clone();
    let mut extra_outputs = Vec::with_capacity(bundles.len());
    for bundle in bundles {
        remainder = remainder.checked_sub(&bundle)?;
        extra_outputs.push(build_output(address.clone(), bundle, params)?);
    }

    Ok(ChangeSplit {
        extra_outputs,
        remainder,
    })
}
