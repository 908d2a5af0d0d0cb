//! Payment signing key loading

use std::path::Path;

use anyhow::{Context, Result, bail};
use horrocard_cardano::SigningKey;
use serde::Deserialize;

/// CBOR prefix of a 32-byte byte string, as written by `cardano-cli`
const CBOR_SEED_PREFIX: &str = "5820";

/// `cardano-cli` text envelope
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextEnvelope {
    #[serde(rename = "type")]
    kind: String,
    cbor_hex: String,
}

pub fn load_signing_key(path: &Path) -> Result<SigningKey> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Reading signing key {}", path.display()))?;
    parse_signing_key(&text).with_context(|| format!("Signing key {}", path.display()))
}

/// Accepts a text envelope of a payment signing key, or a bare hex seed
pub fn parse_signing_key(text: &str) -> Result<SigningKey> {
    let text = text.trim();
    let seed_hex = if text.starts_with('{') {
        let envelope: TextEnvelope = serde_json::from_str(text)?;
        if !envelope.kind.starts_with("PaymentSigningKey") {
            bail!("Unsupported key type '{}'", envelope.kind);
        }
        envelope
            .cbor_hex
            .strip_prefix(CBOR_SEED_PREFIX)
            .context("cborHex is not a 32-byte key")?
            .to_string()
    } else {
        text.to_string()
    };

    let seed: [u8; 32] = hex::decode(&seed_hex)?
        .try_into()
        .map_err(|bytes: Vec<u8>| anyhow::anyhow!("Seed has {} bytes, expected 32", bytes.len()))?;
    Ok(SigningKey::from_seed(&seed))
}
