//! Short display fingerprints for forest nodes.
//!
//! A 32-bit multiplicative string hash rendered as 8 hex digits. Only meant
//! to tell nodes apart on screen; it has no cryptographic strength.

/// Fingerprint of an arbitrary string.
pub fn fingerprint(input: &str) -> String {
    let hash = input.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    });
    format!("{:08x}", hash.unsigned_abs())
}

/// Fingerprint of leaf `index`, salted so that rebuilds get fresh labels.
pub fn leaf_fingerprint(index: usize, salt: u64) -> String {
    fingerprint(&format!("leaf-{index}-{salt}"))
}

/// Fingerprint of an internal node from its children's fingerprints.
pub fn join_fingerprint(left: &str, right: &str) -> String {
    fingerprint(&format!("{left}{right}"))
}
