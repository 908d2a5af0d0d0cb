//! Signer adapter: witnesses a transaction body with the keys its inputs need

use std::{collections::BTreeSet, fmt};

use cryptoxide::ed25519;
use horrocard_codec::body_hash;
use horrocard_common::{KeyHash, Signature, UnspentOutput, VKey, VKeyWitness, WitnessSet};
use tracing::debug;

use crate::error::SigningError;

/// A signing capability. Key material stays behind this trait.
pub trait KeySource {
    /// Sign `message` with the key whose verification key hashes to `key_hash`
    fn sign(&self, key_hash: &KeyHash, message: &[u8]) -> Result<VKeyWitness, SigningError>;
}

/// An ed25519 payment key
pub struct SigningKey {
    secret: [u8; 64],
    vkey: VKey,
}

impl SigningKey {
    /// Derive the key pair from a 32-byte seed, as stored in `.skey` files
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let (secret, public) = ed25519::keypair(seed);
        Self {
            secret,
            vkey: VKey::from(public),
        }
    }

    pub fn vkey(&self) -> VKey {
        self.vkey
    }

    pub fn key_hash(&self) -> KeyHash {
        self.vkey.key_hash()
    }

    pub fn sign_message(&self, message: &[u8]) -> Signature {
        Signature::from(ed25519::signature(message, &self.secret))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey").field("vkey", &self.vkey).finish_non_exhaustive()
    }
}

impl KeySource for SigningKey {
    fn sign(&self, key_hash: &KeyHash, message: &[u8]) -> Result<VKeyWitness, SigningError> {
        if *key_hash != self.key_hash() {
            return Err(SigningError::MissingKey(*key_hash));
        }
        Ok(VKeyWitness::new(self.vkey, self.sign_message(message)))
    }
}

/// Distinct payment key hashes of the inputs; every input must be locked by a key
pub fn required_signers(inputs: &[UnspentOutput]) -> Result<BTreeSet<KeyHash>, SigningError> {
    inputs
        .iter()
        .map(|input| {
            input
                .address
                .payment_key_hash()
                .ok_or_else(|| SigningError::UnsupportedInput(input.utxo.to_string()))
        })
        .collect()
}

/// Sign an encoded body: one verified witness per required signer
pub fn sign(
    key_source: &dyn KeySource,
    body: &[u8],
    inputs: &[UnspentOutput],
) -> Result<WitnessSet, SigningError> {
    let hash = body_hash(body);
    let mut vkey_witnesses = Vec::new();
    for key_hash in required_signers(inputs)? {
        let witness = key_source.sign(&key_hash, hash.as_ref())?;
        if witness.vkey.key_hash() != key_hash || !witness.verify(hash.as_ref()) {
            return Err(SigningError::BadSignature(key_hash));
        }
        vkey_witnesses.push(witness);
    }
    debug!("Signed transaction {hash} with {} witnesses", vkey_witnesses.len());
    Ok(WitnessSet { vkey_witnesses })
}
