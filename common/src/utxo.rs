use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{hash::TxHash, Address, Value};

/// Reference to one output of an earlier transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct UTxOIdentifier {
    pub tx_hash: TxHash,
    pub output_index: u32,
}

impl UTxOIdentifier {
    pub fn new(tx_hash: TxHash, output_index: u32) -> Self {
        Self {
            tx_hash,
            output_index,
        }
    }
}

impl fmt::Display for UTxOIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tx_hash, self.output_index)
    }
}

#[derive(Debug, Error)]
#[error("Bad UTxO reference '{0}', expected <tx hash>#<index>")]
pub struct BadUTxOIdentifier(String);

impl FromStr for UTxOIdentifier {
    type Err = BadUTxOIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || BadUTxOIdentifier(s.to_string());
        let (hash, index) = s.split_once('#').ok_or_else(bad)?;
        Ok(Self {
            tx_hash: hash.parse().map_err(|_| bad())?,
            output_index: index.parse().map_err(|_| bad())?,
        })
    }
}

/// An output that can still be spent, as reported by the chain indexer
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UnspentOutput {
    pub utxo: UTxOIdentifier,
    pub address: Address,
    pub value: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_text_form() {
        let text = format!("{}#3", "ab".repeat(32));
        let id: UTxOIdentifier = text.parse().unwrap();
        assert_eq!(id.output_index, 3);
        assert_eq!(id.to_string(), text);
    }

    #[test]
    fn identifier_rejects_missing_index() {
        assert!("ab".repeat(32).parse::<UTxOIdentifier>().is_err());
        assert!(format!("{}#x", "ab".repeat(32)).parse::<UTxOIdentifier>().is_err());
    }

    #[test]
    fn identifiers_order_by_hash_then_index() {
        let a = UTxOIdentifier::new(TxHash::new([1; 32]), 9);
        let b = UTxOIdentifier::new(TxHash::new([2; 32]), 0);
        let c = UTxOIdentifier::new(TxHash::new([2; 32]), 1);
        assert!(a < b && b < c);
    }
}
