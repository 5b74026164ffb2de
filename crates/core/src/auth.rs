use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub fn hash_token(raw: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hasher.finalize().into()
}

/// Compare a presented token against the stored one.
///
/// Both sides are hashed first so the comparison always runs over 32 bytes
/// regardless of input length. A missing stored token still goes through the
/// comparison and then fails.
pub fn verify_token(stored: Option<&str>, presented: &str) -> bool {
    let expected = hash_token(stored.unwrap_or_default());
    let actual = hash_token(presented);
    let matched: bool = expected.ct_eq(&actual).into();
    matched && stored.is_some()
}
