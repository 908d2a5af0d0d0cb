use crate::{
    utils::to_hash,
    utxo::{map_value, write_output},
    witness::{map_vkey_witnesses, write_witness_set},
};
use anyhow::{Context, Result};
use horrocard_common::{
    Address, Lovelace, TxHash, UTxOIdentifier, VKeyWitness, Value, WitnessSet, crypto::blake2b_256,
};
use minicbor::Encoder;
use pallas_traverse::MultiEraTx;

/// Encode a transaction body map.
///
/// Keys: 0 inputs (sorted by hash then index), 1 outputs, 2 fee, 3 ttl when present.
pub fn encode_body<'a>(
    inputs: impl IntoIterator<Item = &'a UTxOIdentifier>,
    outputs: impl ExactSizeIterator<Item = (&'a Address, &'a Value)>,
    fee: Lovelace,
    ttl: Option<u64>,
) -> Result<Vec<u8>> {
    let mut inputs: Vec<&UTxOIdentifier> = inputs.into_iter().collect();
    inputs.sort();
    inputs.dedup();

    let mut e = Encoder::new(Vec::new());
    e.map(if ttl.is_some() { 4 } else { 3 })?;

    e.u8(0)?.array(inputs.len() as u64)?;
    for input in inputs {
        e.array(2)?.bytes(input.tx_hash.as_ref())?.u32(input.output_index)?;
    }

    e.u8(1)?.array(outputs.len() as u64)?;
    for (address, value) in outputs {
        write_output(&mut e, address, value)?;
    }

    e.u8(2)?.u64(fee)?;

    if let Some(ttl) = ttl {
        e.u8(3)?.u64(ttl)?;
    }

    Ok(e.into_writer())
}

/// Transaction id of an encoded body
pub fn body_hash(body: &[u8]) -> TxHash {
    blake2b_256(body)
}

/// Wrap an encoded body in the full envelope `[body, witness_set, true, null]`.
///
/// The body bytes are copied verbatim so the id computed from them stays valid.
pub fn encode_transaction(body: &[u8], witness_set: &WitnessSet) -> Result<Vec<u8>> {
    let mut e = Encoder::new(Vec::new());
    e.array(4)?;
    e.writer_mut().extend_from_slice(body);
    write_witness_set(&mut e, witness_set)?;
    e.bool(true)?.null()?;
    Ok(e.into_writer())
}

/// The parts of an encoded transaction that the wallet checks after building
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub hash: TxHash,
    pub size: u64,
    pub fee: Option<Lovelace>,
    pub ttl: Option<u64>,
    pub inputs: Vec<UTxOIdentifier>,
    pub outputs: Vec<(Address, Value)>,
    pub vkey_witnesses: Vec<VKeyWitness>,
}

/// Decode a full transaction with Pallas, independently of the encoder above
pub fn decode_transaction(bytes: &[u8]) -> Result<DecodedTransaction> {
    let tx = MultiEraTx::decode(bytes).context("Transaction does not decode")?;

    let inputs = tx
        .consumes()
        .iter()
        .map(|input| {
            let oref = input.output_ref();
            UTxOIdentifier::new(to_hash(oref.hash()), oref.index() as u32)
        })
        .collect();

    let mut outputs = Vec::new();
    for (index, output) in tx.outputs().iter().enumerate() {
        let address = output
            .address()
            .with_context(|| format!("Output {index} has a bad address"))?;
        let address = Address::from_bytes(&address.to_vec())
            .with_context(|| format!("Output {index} has an unsupported address"))?;
        outputs.push((address, map_value(&output.value())));
    }

    let (vkey_witnesses, errors) = map_vkey_witnesses(tx.vkey_witnesses());
    if let Some(error) = errors.first() {
        anyhow::bail!("{error}");
    }

    Ok(DecodedTransaction {
        hash: to_hash(&tx.hash()),
        size: bytes.len() as u64,
        fee: tx.fee(),
        ttl: tx.ttl(),
        inputs,
        outputs,
        vkey_witnesses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use horrocard_common::{AssetName, NetworkId, PolicyId, Signature, VKey};

    fn address(n: u8) -> Address {
        Address::enterprise(NetworkId::Testnet, [n; 28].into())
    }

    fn input(n: u8, index: u32) -> UTxOIdentifier {
        UTxOIdentifier::new(TxHash::new([n; 32]), index)
    }

    fn sample() -> (Vec<UTxOIdentifier>, Vec<(Address, Value)>) {
        let inputs = vec![input(9, 1), input(3, 0)];
        let outputs = vec![
            (address(1), Value::from_lovelace(2_000_000)),
            (
                address(2),
                Value::from_lovelace(1_500_000).with_asset(
                    PolicyId::new([7; 28]),
                    AssetName::new(b"token").unwrap(),
                    42,
                ),
            ),
        ];
        (inputs, outputs)
    }

    fn body(inputs: &[UTxOIdentifier], outputs: &[(Address, Value)], ttl: Option<u64>) -> Vec<u8> {
        encode_body(inputs, outputs.iter().map(|(a, v)| (a, v)), 170_000, ttl).unwrap()
    }

    #[test]
    fn body_map_size_follows_ttl() {
        let (inputs, outputs) = sample();
        assert_eq!(body(&inputs, &outputs, None)[0], 0xa3);
        assert_eq!(body(&inputs, &outputs, Some(1000))[0], 0xa4);
    }

    #[test]
    fn inputs_are_sorted() {
        let (inputs, outputs) = sample();
        let mut reversed = inputs.clone();
        reversed.reverse();
        assert_eq!(body(&inputs, &outputs, None), body(&reversed, &outputs, None));
    }

    #[test]
    fn pallas_reads_back_the_transaction() {
        let (inputs, outputs) = sample();
        let body = body(&inputs, &outputs, Some(50_000_000));
        let witness_set = WitnessSet {
            vkey_witnesses: vec![VKeyWitness::new(VKey::from([5; 32]), Signature::from([6; 64]))],
        };
        let bytes = encode_transaction(&body, &witness_set).unwrap();

        let decoded = decode_transaction(&bytes).unwrap();
        assert_eq!(decoded.hash, body_hash(&body));
        assert_eq!(decoded.fee, Some(170_000));
        assert_eq!(decoded.ttl, Some(50_000_000));
        assert_eq!(decoded.size, bytes.len() as u64);
        assert_eq!(decoded.inputs.len(), 2);
        assert!(decoded.inputs.contains(&input(9, 1)));
        assert_eq!(decoded.outputs, outputs);
        assert_eq!(decoded.vkey_witnesses, witness_set.vkey_witnesses);
    }

    #[test]
    fn envelope_ends_with_valid_flag_and_no_metadata() {
        let (inputs, outputs) = sample();
        let body = body(&inputs, &outputs, None);
        let bytes = encode_transaction(&body, &WitnessSet::placeholder(1)).unwrap();
        assert_eq!(bytes[0], 0x84);
        assert_eq!(&bytes[1..1 + body.len()], body.as_slice());
        assert_eq!(&bytes[bytes.len() - 2..], &[0xf5, 0xf6]);
    }

    #[test]
    fn garbage_does_not_decode() {
        assert!(decode_transaction(&[0x01, 0x02]).is_err());
    }
}
