//! Native assets and multi-asset values

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::{hash::PolicyId, Lovelace};

pub const MAX_ASSET_NAME_LEN: usize = 32;

/// Quantities per asset name within one policy
pub type PolicyAssets = BTreeMap<AssetName, u64>;

/// Quantities per policy, then per asset name
pub type NativeAssetsMap = BTreeMap<PolicyId, PolicyAssets>;

/// Asset name, at most 32 bytes.
///
/// Ordering compares length first and then bytes, which is the canonical CBOR
/// ordering of byte-string map keys.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetName {
    len: u8,
    bytes: [u8; MAX_ASSET_NAME_LEN],
}

impl AssetName {
    pub fn new(data: &[u8]) -> Option<Self> {
        if data.len() > MAX_ASSET_NAME_LEN {
            return None;
        }
        let mut bytes = [0u8; MAX_ASSET_NAME_LEN];
        bytes[..data.len()].copy_from_slice(data);
        Some(Self {
            len: data.len() as u8,
            bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl fmt::Debug for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AssetName").field(&hex::encode(self.as_slice())).finish()
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.as_slice()))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AssetError {
    #[error("Invalid hex in asset identifier: {0}")]
    BadHex(#[from] hex::FromHexError),

    #[error("Asset name longer than {MAX_ASSET_NAME_LEN} bytes")]
    NameTooLong,

    #[error("Asset unit '{0}' is shorter than a policy id")]
    BadUnit(String),
}

impl FromStr for AssetName {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data = hex::decode(s)?;
        Self::new(&data).ok_or(AssetError::NameTooLong)
    }
}

impl Serialize for AssetName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AssetName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: String = Deserialize::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One component of a value: the native coin or a single native asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetUnit {
    Lovelace,
    Native(PolicyId, AssetName),
}

impl fmt::Display for AssetUnit {
    /// Blockfrost `unit` form: `lovelace` or policy hex immediately followed by name hex
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetUnit::Lovelace => f.write_str("lovelace"),
            AssetUnit::Native(policy, name) => write!(f, "{policy}{name}"),
        }
    }
}

impl FromStr for AssetUnit {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "lovelace" {
            return Ok(AssetUnit::Lovelace);
        }
        // 28 byte policy id as hex
        if s.len() < 56 || !s.is_char_boundary(56) {
            return Err(AssetError::BadUnit(s.to_string()));
        }
        let (policy, name) = s.split_at(56);
        Ok(AssetUnit::Native(policy.parse()?, name.parse()?))
    }
}

/// The component that made a value subtraction go negative
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub unit: AssetUnit,
    pub required: u64,
    pub available: u64,
}

/// Value held by an output: lovelace plus native assets.
///
/// Zero quantities are never stored, so two values holding the same non-zero
/// quantities always compare equal and encode identically.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    pub lovelace: Lovelace,
    assets: NativeAssetsMap,
}

impl Value {
    pub fn from_lovelace(lovelace: Lovelace) -> Self {
        Self {
            lovelace,
            assets: NativeAssetsMap::new(),
        }
    }

    /// Builder-style helper; sets (not adds) the quantity of one asset
    pub fn with_asset(mut self, policy: PolicyId, name: AssetName, quantity: u64) -> Self {
        self.insert_asset(policy, name, quantity);
        self
    }

    pub fn assets(&self) -> &NativeAssetsMap {
        &self.assets
    }

    pub fn is_lovelace_only(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn policy_count(&self) -> usize {
        self.assets.len()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.values().map(|names| names.len()).sum()
    }

    /// Sets the quantity of an asset; a zero quantity removes the entry
    pub fn insert_asset(&mut self, policy: PolicyId, name: AssetName, quantity: u64) {
        if quantity == 0 {
            if let Some(names) = self.assets.get_mut(&policy) {
                names.remove(&name);
                if names.is_empty() {
                    self.assets.remove(&policy);
                }
            }
            return;
        }
        self.assets.entry(policy).or_default().insert(name, quantity);
    }

    /// Moves a whole policy group into this value, replacing any existing group
    pub fn insert_policy(&mut self, policy: PolicyId, names: PolicyAssets) {
        let names: PolicyAssets = names.into_iter().filter(|(_, q)| *q > 0).collect();
        if names.is_empty() {
            self.assets.remove(&policy);
        } else {
            self.assets.insert(policy, names);
        }
    }

    pub fn quantity_of(&self, unit: &AssetUnit) -> u64 {
        match unit {
            AssetUnit::Lovelace => self.lovelace,
            AssetUnit::Native(policy, name) => {
                self.assets.get(policy).and_then(|names| names.get(name)).copied().unwrap_or(0)
            }
        }
    }

    /// Every component with a non-zero quantity, lovelace first (even when zero)
    pub fn units(&self) -> impl Iterator<Item = (AssetUnit, u64)> + '_ {
        std::iter::once((AssetUnit::Lovelace, self.lovelace)).chain(self.assets.iter().flat_map(
            |(policy, names)| {
                names.iter().map(move |(name, q)| (AssetUnit::Native(*policy, *name), *q))
            },
        ))
    }

    pub fn checked_add(&self, other: &Value) -> Option<Value> {
        let mut result = self.clone();
        result.lovelace = result.lovelace.checked_add(other.lovelace)?;
        for (policy, names) in &other.assets {
            let entry = result.assets.entry(*policy).or_default();
            for (name, quantity) in names {
                let sum = entry.get(name).copied().unwrap_or(0).checked_add(*quantity)?;
                entry.insert(*name, sum);
            }
        }
        Some(result)
    }

    /// Subtracts `other` from this value, reporting the first component that
    /// would go negative
    pub fn checked_sub(&self, other: &Value) -> Result<Value, Shortfall> {
        let mut result = self.clone();
        for (unit, required) in other.units() {
            let available = self.quantity_of(&unit);
            let remaining = available.checked_sub(required).ok_or(Shortfall {
                unit,
                required,
                available,
            })?;
            match unit {
                AssetUnit::Lovelace => result.lovelace = remaining,
                AssetUnit::Native(policy, name) => result.insert_asset(policy, name, remaining),
            }
        }
        Ok(result)
    }

    /// Sum of many values, `None` on overflow
    pub fn sum<'a>(values: impl IntoIterator<Item = &'a Value>) -> Option<Value> {
        values.into_iter().try_fold(Value::default(), |acc, v| acc.checked_add(v))
    }

    /// This value with a zero coin
    pub fn without_lovelace(&self) -> Value {
        Value {
            lovelace: 0,
            assets: self.assets.clone(),
        }
    }
}
