// Horrocard common library - main library exports

pub mod address;
pub mod asset;
pub mod crypto;
pub mod hash;
pub mod protocol_params;
pub mod types;
pub mod utxo;

// Flattened re-exports
pub use self::address::{Address, AddressError};
pub use self::asset::{AssetName, AssetUnit, NativeAssetsMap, PolicyAssets, Shortfall, Value};
pub use self::crypto::{Signature, VKey, VKeyWitness, WitnessSet};
pub use self::hash::{Hash, KeyHash, PolicyId, ScriptHash, TxHash};
pub use self::protocol_params::ProtocolParameters;
pub use self::types::*;
pub use self::utxo::{UTxOIdentifier, UnspentOutput};
