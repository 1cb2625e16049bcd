use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a password, the format kept in `users.password`
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Check a submitted password against a stored hash.
///
/// The comparison runs over every byte so the time taken does not reveal how
/// much of the hash matched.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let computed = hash_password(password);
    computed.len() == stored_hash.len()
        && computed
            .bytes()
            .zip(stored_hash.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
