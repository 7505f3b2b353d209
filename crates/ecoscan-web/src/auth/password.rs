//! PBKDF2-HMAC-SHA256 password hashing.
//!
//! Stored format is `pbkdf2:sha256:<iterations>$<salt-hex>$<hash-hex>`,
//! which keeps the iteration count alongside the hash so it can be raised
//! later without invalidating existing users.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str, iterations: u32) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut hash);

    format!(
        "pbkdf2:sha256:{}${}${}",
        iterations,
        hex::encode(salt),
        hex::encode(hash)
    )
}

/// Check a password against a stored hash. Malformed stored values simply
/// fail verification.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(header), Some(salt_hex), Some(hash_hex)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let mut header_parts = header.splitn(3, ':');
    if header_parts.next() != Some("pbkdf2") || header_parts.next() != Some("sha256") {
        return false;
    }
    let Some(iterations) = header_parts.next().and_then(|s| s.parse::<u32>().ok()) else {
        return false;
    };

    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(hash_hex)) else {
        return false;
    };
    if expected.len() != HASH_LEN || iterations == 0 {
        return false;
    }

    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut hash);

    // Fixed-length comparison over derived output; timing reveals nothing
    // useful about the password itself.
    hash[..] == expected[..]
}
