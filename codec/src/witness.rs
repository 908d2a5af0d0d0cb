use anyhow::{Result, anyhow};
use horrocard_common::{Signature, VKey, VKeyWitness, WitnessSet};
use minicbor::{Encoder, encode};
use pallas_primitives::alonzo;

/// Write a witness set map; key 0 holds `[[vkey, signature], ...]`
pub fn write_witness_set<W: encode::Write>(
    e: &mut Encoder<W>,
    witness_set: &WitnessSet,
) -> Result<(), encode::Error<W::Error>> {
    if witness_set.vkey_witnesses.is_empty() {
        e.map(0)?;
        return Ok(());
    }

    e.map(1)?.u8(0)?.array(witness_set.vkey_witnesses.len() as u64)?;
    for witness in &witness_set.vkey_witnesses {
        e.array(2)?.bytes(witness.vkey.as_ref())?.bytes(witness.signature.as_ref())?;
    }
    Ok(())
}

pub fn encode_witness_set(witness_set: &WitnessSet) -> Result<Vec<u8>> {
    let mut e = Encoder::new(Vec::new());
    write_witness_set(&mut e, witness_set)?;
    Ok(e.into_writer())
}

fn map_vkey_witness(vkey_witness: &alonzo::VKeyWitness) -> Result<VKeyWitness> {
    Ok(VKeyWitness::new(
        VKey::try_from(vkey_witness.vkey.as_slice()).map_err(|_| anyhow!("Invalid vkey length"))?,
        Signature::try_from(vkey_witness.signature.as_slice())
            .map_err(|_| anyhow!("Invalid signature length"))?,
    ))
}

pub fn map_vkey_witnesses(
    vkey_witnesses: &[alonzo::VKeyWitness],
) -> (Vec<VKeyWitness>, Vec<String>) {
    let mut wits = Vec::new();
    let mut errors = Vec::new();
    for (index, vkey_witness) in vkey_witnesses.iter().enumerate() {
        match map_vkey_witness(vkey_witness) {
            Ok(vkey_witness) => {
                wits.push(vkey_witness);
            }
            Err(e) => {
                errors.push(format!("Invalid vkey witness {index}: {e}"));
            }
        }
    }
    (wits, errors)
}
