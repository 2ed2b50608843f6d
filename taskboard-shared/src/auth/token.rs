/// Opaque authentication token utilities
///
/// This module generates and validates the opaque bearer tokens issued at
/// registration and login. These work in conjunction with the
/// `models::auth_token` module for database operations.
///
/// # Security
///
/// - **Format**: `tb_{40_chars}` (prefix + 40 random alphanumeric chars)
/// - **Storage**: tokens are hashed with SHA-256 before storage; the
///   plaintext is only returned to the client at issue time
/// - **Validation**: constant-time comparison to prevent timing attacks
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::token::{generate_token, hash_token, validate_token_format};
///
/// let (token, hash) = generate_token();
/// assert!(token.starts_with("tb_"));
/// assert!(validate_token_format(&token));
/// assert_eq!(hash, hash_token(&token));
/// ```
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random part of the token (characters)
const TOKEN_RANDOM_LENGTH: usize = 40;

/// Token prefix
const TOKEN_PREFIX: &str = "tb_";

/// Total length of a token (prefix + random)
pub const TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Generates a new authentication token
///
/// Returns the plaintext token together with the SHA-256 hex digest that
/// goes into the database. Key space is 62^40, well beyond brute force.
pub fn generate_token() -> (String, String) {
    let random_part = generate_random_string(TOKEN_RANDOM_LENGTH);
    let token = format!("{}{}", TOKEN_PREFIX, random_part);
    let hash = hash_token(&token);

    (token, hash)
}

/// Generates a random alphanumeric string (base62, URL-safe)
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hashes a token using SHA-256
///
/// Returns the hex-encoded digest (64 characters).
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Validates the token format before any database lookup
///
/// Checks prefix, length, and that the random part is alphanumeric.
pub fn validate_token_format(token: &str) -> bool {
    if token.len() != TOKEN_LENGTH {
        return false;
    }

    if !token.starts_with(TOKEN_PREFIX) {
        return false;
    }

    let random_part = &token[TOKEN_PREFIX.len()..];
    random_part.chars().all(|c| c.is_alphanumeric())
}

/// Validates a token against a stored hash
///
/// Uses constant-time comparison to prevent timing side channels.
pub fn verify_token(token: &str, stored_hash: &str) -> bool {
    let computed_hash = hash_token(token);
    constant_time_compare(&computed_hash, stored_hash)
}

/// Constant-time string comparison
///
/// Always compares the full length so comparison time does not depend on
/// where the strings first differ.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut result = 0u8;
    for i in 0..a_bytes.len() {
        result |= a_bytes[i] ^ b_bytes[i];
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token() {
        let (token1, hash1) = generate_token();
        let (token2, hash2) = generate_token();

        assert!(token1.starts_with("tb_"));
        assert_eq!(token1.len(), TOKEN_LENGTH);

        assert_ne!(token1, token2);
        assert_ne!(hash1, hash2);

        // SHA-256 hex is 64 chars
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        let hash = hash_token("tb_test123");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token("tb_test123"));
        assert_ne!(hash, hash_token("tb_different"));
    }

    #[test]
    fn test_validate_token_format() {
        let (token, _) = generate_token();
        assert!(validate_token_format(&token));

        // Wrong prefix
        assert!(!validate_token_format(&format!(
            "xx_{}",
            "a".repeat(TOKEN_RANDOM_LENGTH)
        )));

        // Too short / too long
        assert!(!validate_token_format("tb_short"));
        assert!(!validate_token_format(&format!(
            "tb_{}",
            "a".repeat(TOKEN_RANDOM_LENGTH + 1)
        )));

        // Special characters
        assert!(!validate_token_format(&format!(
            "tb_{}!",
            "a".repeat(TOKEN_RANDOM_LENGTH - 1)
        )));
    }

    #[test]
    fn test_verify_token() {
        let (token, hash) = generate_token();

        assert!(verify_token(&token, &hash));

        let (wrong_token, _) = generate_token();
        assert!(!verify_token(&wrong_token, &hash));
        assert!(!verify_token("", &hash));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));

        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hello2"));
        assert!(!constant_time_compare("short", "longer string"));
    }
}
