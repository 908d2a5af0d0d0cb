//! Hashing helpers and ed25519 key and witness types

use std::{fmt, ops::Deref, str::FromStr};

use blake2::{
    digest::consts::{U28, U32},
    Blake2b, Digest,
};
use serde_with::{hex::Hex, serde_as};

use crate::hash::{Hash, KeyHash, TxHash};

/// Blake2b-256 digest, as used for transaction ids
pub fn blake2b_256(data: &[u8]) -> TxHash {
    let mut hasher = Blake2b::<U32>::new();
    Digest::update(&mut hasher, data);
    Hash::new(hasher.finalize().into())
}

/// Blake2b-224 digest, as used for key and script hashes
pub fn blake2b_224(data: &[u8]) -> Hash<28> {
    let mut hasher = Blake2b::<U28>::new();
    Digest::update(&mut hasher, data);
    Hash::new(hasher.finalize().into())
}

/// Hash of a verification key, the credential inside payment addresses
pub fn keyhash(vkey: &[u8]) -> KeyHash {
    blake2b_224(vkey)
}

macro_rules! declare_byte_array_type {
    ($name:ident, $size:expr) => {
        #[serde_as]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(#[serde_as(as = "Hex")] [u8; $size]);

        impl $name {
            pub const SIZE: usize = $size;

            pub fn as_inner(&self) -> &[u8; $size] {
                &self.0
            }
        }

        impl From<[u8; $size]> for $name {
            fn from(bytes: [u8; $size]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = std::array::TryFromSliceError;
            fn try_from(arr: &[u8]) -> Result<Self, Self::Error> {
                Ok($name(arr.try_into()?))
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = [u8; $size];
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = hex::FromHexError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut bytes = [0u8; $size];
                hex::decode_to_slice(s, &mut bytes)?;
                Ok(Self(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }
    };
}

declare_byte_array_type!(VKey, 32);

declare_byte_array_type!(Signature, 64);

impl VKey {
    pub fn key_hash(&self) -> KeyHash {
        keyhash(&self.0)
    }
}

/// A verification key with its signature over a transaction body hash
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct VKeyWitness {
    pub vkey: VKey,
    pub signature: Signature,
}

impl VKeyWitness {
    pub fn new(vkey: VKey, signature: Signature) -> Self {
        Self { vkey, signature }
    }

    /// All-zero witness with the exact encoded size of a real one
    pub fn placeholder() -> Self {
        Self {
            vkey: VKey([0u8; 32]),
            signature: Signature([0u8; 64]),
        }
    }

    pub fn verify(&self, message: &[u8]) -> bool {
        cryptoxide::ed25519::verify(message, &self.vkey.0, &self.signature.0)
    }
}

/// Witnesses attached to a transaction; only key witnesses are produced here
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WitnessSet {
    pub vkey_witnesses: Vec<VKeyWitness>,
}

impl WitnessSet {
    /// Zeroed witnesses of the final shape, for sizing a transaction before signing
    pub fn placeholder(signers: usize) -> Self {
        Self {
            vkey_witnesses: vec![VKeyWitness::placeholder(); signers],
        }
    }
}
