use anyhow::Result;
use horrocard_common::{Address, AssetName, Value};
use minicbor::{Encoder, encode};
use pallas_traverse::{MultiEraPolicyAssets, MultiEraValue};

use crate::utils::to_hash;

/// Write a value: a bare coin when lovelace-only, otherwise
/// `[coin, { policy => { name => quantity } }]` with keys in canonical order
pub fn write_value<W: encode::Write>(
    e: &mut Encoder<W>,
    value: &Value,
) -> Result<(), encode::Error<W::Error>> {
    if value.is_lovelace_only() {
        e.u64(value.lovelace)?;
        return Ok(());
    }

    e.array(2)?.u64(value.lovelace)?;
    e.map(value.policy_count() as u64)?;
    for (policy, names) in value.assets() {
        e.bytes(policy.as_ref())?.map(names.len() as u64)?;
        for (name, quantity) in names {
            e.bytes(name.as_slice())?.u64(*quantity)?;
        }
    }
    Ok(())
}

/// Write a legacy (array form) output: `[address bytes, value]`
pub fn write_output<W: encode::Write>(
    e: &mut Encoder<W>,
    address: &Address,
    value: &Value,
) -> Result<(), encode::Error<W::Error>> {
    e.array(2)?.bytes(&address.to_bytes())?;
    write_value(e, value)
}

pub fn encode_value(value: &Value) -> Result<Vec<u8>> {
    let mut e = Encoder::new(Vec::new());
    write_value(&mut e, value)?;
    Ok(e.into_writer())
}

/// Encoded length of a value in bytes
pub fn value_size(value: &Value) -> Result<u64> {
    Ok(encode_value(value)?.len() as u64)
}

pub fn map_value(pallas_value: &MultiEraValue) -> Value {
    let mut value = Value::from_lovelace(pallas_value.coin());

    for policy_group in pallas_value.assets() {
        match policy_group {
            MultiEraPolicyAssets::AlonzoCompatibleOutput(policy, kvps) => {
                let policy_id = to_hash(policy);
                for (name, amount) in kvps.iter() {
                    match AssetName::new(name) {
                        Some(asset_name) => value.insert_asset(policy_id, asset_name, *amount),
                        None => tracing::error!("Asset name too long under policy {policy_id}"),
                    }
                }
            }
            MultiEraPolicyAssets::ConwayOutput(policy, kvps) => {
                let policy_id = to_hash(policy);
                for (name, amount) in kvps.iter() {
                    match AssetName::new(name) {
                        Some(asset_name) => {
                            value.insert_asset(policy_id, asset_name, u64::from(*amount))
                        }
                        None => tracing::error!("Asset name too long under policy {policy_id}"),
                    }
                }
            }
            _ => {}
        }
    }
    value
}
