//! Cardano payment addresses
//!
//! Shelley addresses are read from and written to bech32, Byron addresses from
//! base58. Both keep their raw bytes available for the ledger encoding.

use std::fmt;

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::{
    hash::{KeyHash, ScriptHash},
    NetworkId,
};

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("Address is neither bech32 nor base58: {0}")]
    Unparseable(String),

    #[error("Empty address data")]
    Empty,

    #[error("Unsupported address header type {0}")]
    UnsupportedType(u8),

    #[error("Address payload has wrong length {0}")]
    BadLength(usize),

    #[error("Address is for {found} but {expected} was expected")]
    WrongNetwork {
        expected: NetworkId,
        found: NetworkId,
    },

    #[error("Bech32 encoding failed: {0}")]
    Bech32(String),
}

/// A Shelley-era address - payment part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShelleyAddressPaymentPart {
    /// Payment to a key
    PaymentKeyHash(KeyHash),

    /// Payment to a script
    ScriptHash(ScriptHash),
}

/// A Shelley-era address - delegation part
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShelleyAddressDelegationPart {
    /// No delegation (enterprise addresses)
    None,

    /// Delegation to stake key
    StakeKeyHash(KeyHash),

    /// Delegation to script key
    ScriptHash(ScriptHash),

    /// Delegation to pointer, kept as its variable-length encoded bytes
    Pointer(Vec<u8>),
}

/// A Shelley-era address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShelleyAddress {
    pub network: NetworkId,
    pub payment: ShelleyAddressPaymentPart,
    pub delegation: ShelleyAddressDelegationPart,
}

impl ShelleyAddress {
    fn header(&self) -> u8 {
        let payment_bits = match self.payment {
            ShelleyAddressPaymentPart::PaymentKeyHash(_) => 0,
            ShelleyAddressPaymentPart::ScriptHash(_) => 1,
        };
        let delegation_bits = match self.delegation {
            ShelleyAddressDelegationPart::StakeKeyHash(_) => 0,
            ShelleyAddressDelegationPart::ScriptHash(_) => 1,
            ShelleyAddressDelegationPart::Pointer(_) => 2,
            ShelleyAddressDelegationPart::None => 3,
        };
        self.network.header_bits() | (payment_bits << 4) | (delegation_bits << 5)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = vec![self.header()];
        match &self.payment {
            ShelleyAddressPaymentPart::PaymentKeyHash(hash)
            | ShelleyAddressPaymentPart::ScriptHash(hash) => data.extend_from_slice(hash.as_ref()),
        }
        match &self.delegation {
            ShelleyAddressDelegationPart::None => {}
            ShelleyAddressDelegationPart::StakeKeyHash(hash)
            | ShelleyAddressDelegationPart::ScriptHash(hash) => {
                data.extend_from_slice(hash.as_ref())
            }
            ShelleyAddressDelegationPart::Pointer(pointer) => data.extend_from_slice(pointer),
        }
        data
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, AddressError> {
        let header = *data.first().ok_or(AddressError::Empty)?;
        let kind = header >> 4;
        // Types 8 (Byron) and 14/15 (stake addresses) cannot receive payments
        if kind > 7 {
            return Err(AddressError::UnsupportedType(kind));
        }

        let network = match header & 0x0f {
            0 => NetworkId::Testnet,
            _ => NetworkId::Mainnet,
        };

        let hash_at = |start: usize| -> Result<KeyHash, AddressError> {
            data.get(start..start + 28)
                .and_then(|slice| KeyHash::try_from(slice).ok())
                .ok_or(AddressError::BadLength(data.len()))
        };

        let payment = match kind & 0x01 {
            0 => ShelleyAddressPaymentPart::PaymentKeyHash(hash_at(1)?),
            _ => ShelleyAddressPaymentPart::ScriptHash(hash_at(1)?),
        };

        let (delegation, expected_len) = match kind >> 1 {
            0 => (ShelleyAddressDelegationPart::StakeKeyHash(hash_at(29)?), 57),
            1 => (ShelleyAddressDelegationPart::ScriptHash(hash_at(29)?), 57),
            2 => (
                ShelleyAddressDelegationPart::Pointer(data[29..].to_vec()),
                data.len().max(30),
            ),
            _ => (ShelleyAddressDelegationPart::None, 29),
        };
        if data.len() != expected_len {
            return Err(AddressError::BadLength(data.len()));
        }

        Ok(Self {
            network,
            payment,
            delegation,
        })
    }

    /// Convert to addr1xxx form
    pub fn to_bech32(&self) -> Result<String, AddressError> {
        let hrp = Hrp::parse(self.network.address_hrp())
            .map_err(|e| AddressError::Bech32(e.to_string()))?;
        bech32::encode::<Bech32>(hrp, &self.to_bytes())
            .map_err(|e| AddressError::Bech32(e.to_string()))
    }
}

/// a Byron-era address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ByronAddress {
    /// Raw payload
    pub payload: Vec<u8>,
}

/// A payment address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    Byron(ByronAddress),
    Shelley(ShelleyAddress),
}

impl Address {
    /// Enterprise address (no delegation part) paying to a key hash
    pub fn enterprise(network: NetworkId, key_hash: KeyHash) -> Self {
        Self::Shelley(ShelleyAddress {
            network,
            payment: ShelleyAddressPaymentPart::PaymentKeyHash(key_hash),
            delegation: ShelleyAddressDelegationPart::None,
        })
    }

    /// Read from bech32 (Shelley) or base58 (Byron) text
    pub fn from_string(text: &str) -> Result<Self, AddressError> {
        if let Ok((_, data)) = bech32::decode(text) {
            return Ok(Self::Shelley(ShelleyAddress::from_bytes(&data)?));
        }
        match bs58::decode(text).into_vec() {
            Ok(payload) if !payload.is_empty() => Ok(Self::Byron(ByronAddress { payload })),
            _ => Err(AddressError::Unparseable(text.to_string())),
        }
    }

    /// Parse and require the address to belong to `network`
    pub fn parse_for(text: &str, network: NetworkId) -> Result<Self, AddressError> {
        let address = Self::from_string(text)?;
        if let Some(found) = address.network() {
            if found != network {
                return Err(AddressError::WrongNetwork {
                    expected: network,
                    found,
                });
            }
        }
        Ok(address)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, AddressError> {
        match data.first() {
            None => Err(AddressError::Empty),
            Some(header) if header >> 4 == 8 => Ok(Self::Byron(ByronAddress {
                payload: data.to_vec(),
            })),
            Some(_) => Ok(Self::Shelley(ShelleyAddress::from_bytes(data)?)),
        }
    }

    /// Raw bytes as they appear in a transaction output
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Byron(byron) => byron.payload.clone(),
            Self::Shelley(shelley) => shelley.to_bytes(),
        }
    }

    /// Network of a Shelley address; Byron payloads carry no plain network tag
    pub fn network(&self) -> Option<NetworkId> {
        match self {
            Self::Byron(_) => None,
            Self::Shelley(shelley) => Some(shelley.network),
        }
    }

    /// The key hash that must sign to spend from this address, if any
    pub fn payment_key_hash(&self) -> Option<KeyHash> {
        match self {
            Self::Shelley(ShelleyAddress {
                payment: ShelleyAddressPaymentPart::PaymentKeyHash(hash),
                ..
            }) => Some(*hash),
            _ => None,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byron(byron) => f.write_str(&bs58::encode(&byron.payload).into_string()),
            Self::Shelley(shelley) => f.write_str(&shelley.to_bech32().map_err(|_| fmt::Error)?),
        }
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: String = Deserialize::deserialize(deserializer)?;
        Self::from_string(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keyhash;

    // Standard keys from CIP-19
    fn test_payment_key_hash() -> KeyHash {
        let payment_key = "addr_vk1w0l2sr2zgfm26ztc6nl9xy8ghsk5sh6ldwemlpmp9xylzy4dtf7st80zhd";
        let (_, pubkey) = bech32::decode(payment_key).expect("Invalid Bech32 string");
        keyhash(&pubkey)
    }

    fn test_stake_key_hash() -> KeyHash {
        let stake_key = "stake_vk1px4j0r2fk7ux5p23shz8f3y5y2qam7s954rgf3lg5merqcj6aetsft99wu";
        let (_, pubkey) = bech32::decode(stake_key).expect("Invalid Bech32 string");
        keyhash(&pubkey)
    }

    fn test_script_hash() -> ScriptHash {
        let script_hash = "script1cda3khwqv60360rp5m7akt50m6ttapacs8rqhn5w342z7r35m37";
        let (_, hash) = bech32::decode(script_hash).expect("Invalid Bech32 string");
        ScriptHash::try_from(hash.as_slice()).unwrap()
    }

    // Test vectors from CIP-19
    #[test]
    fn base_address_round_trips() {
        let address = Address::Shelley(ShelleyAddress {
            network: NetworkId::Mainnet,
            payment: ShelleyAddressPaymentPart::PaymentKeyHash(test_payment_key_hash()),
            delegation: ShelleyAddressDelegationPart::StakeKeyHash(test_stake_key_hash()),
        });

        let text = address.to_string();
        assert_eq!(text, "addr1qx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3n0d3vllmyqwsx5wktcd8cc3sq835lu7drv2xwl2wywfgse35a3x");
        assert_eq!(Address::from_string(&text).unwrap(), address);
        assert_eq!(address.payment_key_hash(), Some(test_payment_key_hash()));
    }

    #[test]
    fn script_payment_has_no_key_hash() {
        let text = "addr1z8phkx6acpnf78fuvxn0mkew3l0fd058hzquvz7w36x4gten0d3vllmyqwsx5wktcd8cc3sq835lu7drv2xwl2wywfgs9yc0hh";
        let address = Address::from_string(text).unwrap();
        match &address {
            Address::Shelley(shelley) => {
                assert_eq!(shelley.payment, ShelleyAddressPaymentPart::ScriptHash(test_script_hash()))
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(address.payment_key_hash(), None);
        assert_eq!(address.to_string(), text);
    }

    #[test]
    fn pointer_address_keeps_raw_pointer() {
        let text = "addr1gx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer5pnz75xxcrzqf96k";
        let address = Address::from_string(text).unwrap();
        assert_eq!(address.to_string(), text);
    }

    #[test]
    fn enterprise_testnet_address() {
        let address = Address::enterprise(NetworkId::Testnet, test_payment_key_hash());
        let text = address.to_string();
        assert_eq!(text, "addr_test1vz2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzerspjrlsz");
        assert_eq!(address.to_bytes().len(), 29);
        assert_eq!(address.to_bytes()[0], 0x60);
    }

    #[test]
    fn network_mismatch_is_rejected() {
        let text = "addr_test1vz2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzerspjrlsz";
        assert!(Address::parse_for(text, NetworkId::Testnet).is_ok());
        assert!(matches!(
            Address::parse_for(text, NetworkId::Mainnet),
            Err(AddressError::WrongNetwork { .. })
        ));
    }

    #[test]
    fn stake_address_is_not_a_payment_address() {
        let text = "stake1uyehkck0lajq8gr28t9uxnuvgcqrc6070x3k9r8048z8y5gh6ffgw";
        assert!(matches!(
            Address::from_string(text),
            Err(AddressError::UnsupportedType(14))
        ));
    }

    #[test]
    fn byron_address_round_trips() {
        let text = "Ae2tdPwUPEZFRbyhz3cpfC2CumGzNkFBN2L42rcUc2yjQpEkxDbkPodpMAi";
        let address = Address::from_string(text).unwrap();
        assert!(matches!(address, Address::Byron(_)));
        assert_eq!(address.network(), None);
        assert_eq!(address.to_string(), text);
        assert_eq!(Address::from_bytes(&address.to_bytes()).unwrap(), address);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(Address::from_string("not an address!").is_err());
    }
}
