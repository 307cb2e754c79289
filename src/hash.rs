use sha2::{Digest, Sha256};

///
/// Truncated content hash used to derive index collection names.
///
/// Computes a SHA-256 digest of the UTF-8 encoding of the input, then picks
/// 10 characters out of the input itself: the i-th output character is the
/// input byte at position `digest[i] % input.len()`.
///
/// - Deterministic across platforms.
/// - The output alphabet is a subset of the input's own characters, so the
///   result stays a legal collection-name fragment.
/// - ASCII inputs only: the byte-indexed modulus is not meaningful for
///   multi-byte characters. Type and field names are ASCII in practice.
///
#[must_use]
pub fn truncated_hash(text: &str) -> String {
    debug_assert!(text.is_ascii(), "truncated_hash is defined for ASCII input");
    debug_assert!(!text.is_empty(), "truncated_hash input must be non-empty");

    let bytes = text.as_bytes();
    let digest = Sha256::digest(bytes);

    digest
        .iter()
        .take(10)
        .map(|b| bytes[*b as usize % bytes.len()] as char)
        .collect()
}

///
/// TESTS
///
