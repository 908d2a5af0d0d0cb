//! Parsing payment amounts from the command line

use anyhow::{Context, Result, bail};
use horrocard_common::{AssetUnit, LOVELACE_PER_ADA, Lovelace, Value};

const ADA_DECIMALS: usize = 6;

/// ADA with up to six decimals, e.g. `12` or `1.25`
pub fn parse_ada(text: &str) -> Result<Lovelace> {
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    if whole.is_empty() && fraction.is_empty() {
        bail!("Empty amount");
    }
    if fraction.len() > ADA_DECIMALS {
        bail!("'{text}' has more than {ADA_DECIMALS} decimals");
    }
    let whole: Lovelace = if whole.is_empty() { 0 } else { whole.parse()? };
    let fraction: Lovelace = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<ADA_DECIMALS$}").parse()?
    };
    whole
        .checked_mul(LOVELACE_PER_ADA)
        .and_then(|lovelace| lovelace.checked_add(fraction))
        .with_context(|| format!("'{text}' ADA is out of range"))
}

/// `<policy hex><name hex>:<quantity>`, the unit as Blockfrost prints it
pub fn parse_asset(text: &str) -> Result<(AssetUnit, u64)> {
    let (unit, quantity) = text.rsplit_once(':').context("Expected <unit>:<quantity>")?;
    let unit: AssetUnit = unit.parse()?;
    if unit == AssetUnit::Lovelace {
        bail!("Use --ada for lovelace");
    }
    Ok((unit, quantity.parse().with_context(|| format!("Quantity of {unit}"))?))
}

/// The value to pay: the ADA amount plus every listed asset
pub fn payment_value(lovelace: Lovelace, assets: &[(AssetUnit, u64)]) -> Result<Value> {
    let mut value = Value::from_lovelace(lovelace);
    for (unit, quantity) in assets {
        if let AssetUnit::Native(policy, name) = unit {
            let total = value
                .quantity_of(unit)
                .checked_add(*quantity)
                .with_context(|| format!("Quantity of {unit} overflows"))?;
            value.insert_asset(*policy, *name, total);
        }
    }
    Ok(value)
}
