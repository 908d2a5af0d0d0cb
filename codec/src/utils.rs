use horrocard_common::Hash;

/// Convert a Pallas Hash reference to a Horrocard Hash (owned)
/// Works for any hash size N
pub fn to_hash<const N: usize>(pallas_hash: &pallas_primitives::Hash<N>) -> Hash<N> {
    Hash::new(**pallas_hash)
}
