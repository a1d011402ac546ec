//! Opaque key generation
//!
//! Generates cryptographically secure API keys and verification tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;

/// Generator for opaque random credentials
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    /// Prefix for all generated keys (e.g., "mk_")
    prefix: String,
    /// Number of random bytes to generate
    key_bytes: usize,
}

impl KeyGenerator {
    /// Create a new generator
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            key_bytes: 32,
        }
    }

    /// Generator for tenant API keys
    pub fn api_keys() -> Self {
        Self::new("mk_")
    }

    /// Generator for verification tokens, which travel in URLs unprefixed
    pub fn verification_tokens() -> Self {
        Self::new("").with_key_bytes(24)
    }

    /// Set the number of random bytes
    pub fn with_key_bytes(mut self, bytes: usize) -> Self {
        self.key_bytes = bytes;
        self
    }

    /// Generate a new key
    pub fn generate(&self) -> String {
        let mut random_bytes = vec![0u8; self.key_bytes];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        format!("{}{}", self.prefix, URL_SAFE_NO_PAD.encode(&random_bytes))
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::api_keys()
    }
}

/// Short, log-safe form of a secret
pub fn key_prefix(key: &str) -> String {
    key.chars().take(8).collect()
}

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut result = 0u8;

    for i in 0..a.len() {
        result |= a_bytes[i] ^ b_bytes[i];
    }

    result == 0
}
