//! Secret-key generation for the Sentry web process.

use rand::Rng;

const URLSAFE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Generated key length. 67 characters over a 64-symbol alphabet carries a
/// little over 50 bytes of randomness, the same size Python's
/// `secrets.token_urlsafe(50)` produces.
pub const SECRET_KEY_LEN: usize = 67;

/// Generate a fresh URL-safe secret key. A new key is generated on every
/// run and never read back from a previous one.
pub fn generate_secret_key() -> String {
    let mut rng = rand::thread_rng();
    (0..SECRET_KEY_LEN)
        .map(|_| URLSAFE[rng.gen_range(0..URLSAFE.len())] as char)
        .collect()
}
