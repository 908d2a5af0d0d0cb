use horrocard_codec::{body_hash, encode_body, encode_transaction};
use horrocard_common::{Lovelace, TxHash, UnspentOutput, WitnessSet};

use crate::{error::TxBuilderError, output::TransactionOutput};

/// A transaction under construction
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub(crate) inputs: Vec<UnspentOutput>,
    pub(crate) outputs: Vec<TransactionOutput>,
    pub(crate) fee: Lovelace,
    pub(crate) ttl: Option<u64>,
}

impl TransactionDraft {
    pub fn inputs(&self) -> &[UnspentOutput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    pub fn fee(&self) -> Lovelace {
        self.fee
    }

    pub fn ttl(&self) -> Option<u64> {
        self.ttl
    }

    pub fn body_bytes(&self) -> Result<Vec<u8>, TxBuilderError> {
        encode_body(
            self.inputs.iter().map(|input| &input.utxo),
            self.outputs.iter().map(|output| (output.address(), output.value())),
            self.fee,
            self.ttl,
        )
        .map_err(TxBuilderError::codec)
    }

    /// Full encoding with the given witnesses
    pub fn to_bytes(&self, witness_set: &WitnessSet) -> Result<Vec<u8>, TxBuilderError> {
        encode_transaction(&self.body_bytes()?, witness_set).map_err(TxBuilderError::codec)
    }

    /// Length of the signed transaction, using zeroed witnesses of the real size
    pub fn placeholder_size(&self, signers: usize) -> Result<u64, TxBuilderError> {
        Ok(self.to_bytes(&WitnessSet::placeholder(signers))?.len() as u64)
    }
}

/// A signed, serialized transaction; never changes after creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    draft: TransactionDraft,
    witness_set: WitnessSet,
    bytes: Vec<u8>,
    hash: TxHash,
}

impl SignedTransaction {
    pub(crate) fn new(draft: TransactionDraft, witness_set: WitnessSet) -> Result<Self, TxBuilderError> {
        let body = draft.body_bytes()?;
        let hash = body_hash(&body);
        let bytes = encode_transaction(&body, &witness_set).map_err(TxBuilderError::codec)?;
        Ok(Self {
            draft,
            witness_set,
            bytes,
            hash,
        })
    }

    pub fn draft(&self) -> &TransactionDraft {
        &self.draft
    }

    pub fn witness_set(&self) -> &WitnessSet {
        &self.witness_set
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    pub fn fee(&self) -> Lovelace {
        self.draft.fee
    }
}
