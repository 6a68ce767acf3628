//! FNV-1a hashing of registry state.
//!
//! Used to compare final lattice states across runs. Not cryptographic.

/// FNV-1a offset basis for 64-bit.
pub(crate) const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

/// Feed a u32 (as 4 LE bytes) into an FNV-1a hash state.
#[inline]
pub(crate) fn fnv1a_u32(mut hash: u64, v: u32) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// Feed a u64 (as 8 LE bytes) into an FNV-1a hash state.
#[inline]
pub(crate) fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_offset_basis() {
        assert_eq!(FNV_OFFSET, 0xcbf29ce484222325);
    }

    #[test]
    fn known_vector() {
        // FNV-1a("a") = 0xaf63dc4c8601ec8c
        assert_eq!(fnv1a_byte(FNV_OFFSET, b'a'), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn order_matters() {
        let ab = fnv1a_u32(fnv1a_u32(FNV_OFFSET, 1), 2);
        let ba = fnv1a_u32(fnv1a_u32(FNV_OFFSET, 2), 1);
        assert_ne!(ab, ba);
    }

    #[test]
    fn u64_differs_from_u32_pair_order() {
        let a = fnv1a_u64(FNV_OFFSET, 1);
        let b = fnv1a_u32(fnv1a_u32(FNV_OFFSET, 0), 1);
        assert_ne!(a, b);
    }
}
