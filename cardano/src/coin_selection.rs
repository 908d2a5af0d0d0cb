//! Random-improve coin selection
//!
//! Phase one walks the requested outputs from the largest coin down and, for
//! each component an output asks for, draws random UTxOs holding that
//! component until the running total covers that output and every one
//! walked before it. Phase two keeps drawing while fewer
//! than `min_input_count` inputs are selected, accepting a draw only if it
//! moves the total towards twice the request without passing it. Every drawn
//! UTxO leaves the pool, so none is selected twice.

use std::collections::HashSet;

use horrocard_common::{AssetUnit, UTxOIdentifier, UnspentOutput, Value};
use rand::Rng;
use tracing::debug;

use crate::{error::TxBuilderError, output::TransactionOutput};

/// Outcome of a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub inputs: Vec<UnspentOutput>,
    /// Selected total minus requested total, per component
    pub change: Value,
    /// Pool entries left unselected, for later top-ups
    pub remaining: Vec<UnspentOutput>,
}

/// Select inputs covering the requested outputs
pub fn select<R: Rng + ?Sized>(
    rng: &mut R,
    pool: Vec<UnspentOutput>,
    requested: &[TransactionOutput],
    min_input_count: usize,
    excluded: &HashSet<UTxOIdentifier>,
) -> Result<Selection, TxBuilderError> {
    let targets: Vec<Value> = requested.iter().map(|output| output.value().clone()).collect();
    select_values(rng, pool, &targets, min_input_count, excluded)
}

/// Select inputs covering raw target values
pub fn select_values<R: Rng + ?Sized>(
    rng: &mut R,
    pool: Vec<UnspentOutput>,
    targets: &[Value],
    min_input_count: usize,
    excluded: &HashSet<UTxOIdentifier>,
) -> Result<Selection, TxBuilderError> {
    if targets.is_empty() {
        return Err(TxBuilderError::InvalidInput("Nothing requested".to_string()));
    }

    let mut seen = HashSet::new();
    let mut available: Vec<UnspentOutput> = pool
        .into_iter()
        .filter(|utxo| !excluded.contains(&utxo.utxo) && seen.insert(utxo.utxo))
        .collect();
    if available.is_empty() {
        return Err(TxBuilderError::InvalidInput("UTxO pool is empty".to_string()));
    }

    let requested_total =
        Value::sum(targets).ok_or_else(|| TxBuilderError::overflow("requested total"))?;
    let pool_total = Value::sum(available.iter().map(|utxo| &utxo.value))
        .ok_or_else(|| TxBuilderError::overflow("pool total"))?;

    // Largest coin first; stable for equal coins
    let mut ordered: Vec<&Value> = targets.iter().collect();
    ordered.sort_by(|a, b| b.lovelace.cmp(&a.lovelace));

    let mut inputs: Vec<UnspentOutput> = Vec::new();
    let mut covered = Value::default();
    let mut owed = Value::default();
    for target in ordered {
        owed = owed.checked_add(target).ok_or_else(|| TxBuilderError::overflow("selection"))?;
        // Assets first so their UTxOs also count towards the coin
        let mut units: Vec<AssetUnit> = target
            .units()
            .filter(|(_, quantity)| *quantity > 0)
            .map(|(unit, _)| unit)
            .collect();
        units.rotate_left(usize::from(target.lovelace > 0));

        for unit in units {
            let needed = owed.quantity_of(&unit);
            while covered.quantity_of(&unit) < needed {
                let holders: Vec<usize> = available
                    .iter()
                    .enumerate()
                    .filter(|(_, utxo)| utxo.value.quantity_of(&unit) > 0)
                    .map(|(index, _)| index)
                    .collect();
                if holders.is_empty() {
                    return Err(TxBuilderError::InsufficientFunds {
                        unit,
                        requested: requested_total.quantity_of(&unit),
                        available: pool_total.quantity_of(&unit),
                    });
                }
                let pick = holders[rng.random_range(0..holders.len())];
                let utxo = available.swap_remove(pick);
                covered = covered
                    .checked_add(&utxo.value)
                    .ok_or_else(|| TxBuilderError::overflow("selection"))?;
                inputs.push(utxo);
            }
        }
    }

    let mut selected_total = covered;

    let mut rejected = Vec::new();
    while inputs.len() < min_input_count && !available.is_empty() {
        let candidate = available.swap_remove(rng.random_range(0..available.len()));
        if improves(&selected_total, &candidate.value, &requested_total) {
            selected_total = selected_total
                .checked_add(&candidate.value)
                .ok_or_else(|| TxBuilderError::overflow("selection"))?;
            inputs.push(candidate);
        } else {
            rejected.push(candidate);
        }
    }
    available.extend(rejected);

    let change = selected_total.checked_sub(&requested_total)?;

    debug!(
        inputs = inputs.len(),
        remaining = available.len(),
        change = change.lovelace,
        "Coin selection done"
    );

    Ok(Selection {
        inputs,
        change,
        remaining: available,
    })
}

/// A candidate improves the selection if, once added, no requested component
/// exceeds twice its request and at least one component gets closer to it
fn improves(selected: &Value, candidate: &Value, requested: &Value) -> bool {
    let mut closer = false;
    for (unit, wanted) in requested.units().filter(|(_, quantity)| *quantity > 0) {
        let added = candidate.quantity_of(&unit);
        let Some(total) = selected.quantity_of(&unit).checked_add(added) else {
            return false;
        };
        if total > wanted.saturating_mul(2) {
            return false;
        }
        closer |= added > 0;
    }
    closer
}
