//! Key-value key types and traits.
//!
//! NATS KV keys are restricted to `[-/_=.a-zA-Z0-9]`, so free-form input is
//! encoded before it becomes a key.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::Error;

/// Marker trait for KV key types.
///
/// This trait defines how keys are formatted for storage in NATS KV.
pub trait KvKey: fmt::Debug + fmt::Display + FromStr + Clone + Send + Sync + 'static {}

/// Key for a cached search, derived from the SHA-256 digest of the raw cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    digest: String,
}

impl CacheKey {
    /// Hashes an arbitrary cache key into a fixed-length KV key.
    pub fn new(raw: &str) -> Self {
        let digest = Sha256::digest(raw.as_bytes());
        Self {
            digest: hex::encode(digest),
        }
    }
}

impl KvKey for CacheKey {}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.digest)
    }
}

impl FromStr for CacheKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::operation(
                "parse_cache_key",
                format!("not a sha256 hex digest: {s}"),
            ));
        }
        Ok(Self {
            digest: s.to_ascii_lowercase(),
        })
    }
}

/// Key for an account, hex-encoding the username.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UsernameKey(pub String);

impl KvKey for UsernameKey {}

impl fmt::Display for UsernameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0.as_bytes()))
    }
}

impl FromStr for UsernameKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes =
            hex::decode(s).map_err(|e| Error::operation("parse_username_key", e.to_string()))?;
        let username = String::from_utf8(bytes)
            .map_err(|e| Error::operation("parse_username_key", e.to_string()))?;
        Ok(Self(username))
    }
}

impl From<&str> for UsernameKey {
    fn from(username: &str) -> Self {
        Self(username.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_valid_kv_key(key: &str) -> bool {
        key.bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'/' | b'_' | b'=' | b'.'))
    }

    #[test]
    fn test_cache_key_is_kv_safe() {
        let key = CacheKey::new("what is the invoice total?_scan 01.pdf");
        let rendered = key.to_string();
        assert_eq!(rendered.len(), 64);
        assert!(is_valid_kv_key(&rendered));
    }

    #[test]
    fn test_cache_key_is_stable() {
        assert_eq!(CacheKey::new("q_a.pdf"), CacheKey::new("q_a.pdf"));
        assert_ne!(CacheKey::new("q_a.pdf"), CacheKey::new("q_b.pdf"));
    }

    #[test]
    fn test_cache_key_roundtrip() {
        let key = CacheKey::new("query_file");
        let parsed: CacheKey = key.to_string().parse().unwrap();
        assert_eq!(key, parsed);
        assert!("not-a-digest".parse::<CacheKey>().is_err());
    }

    #[test]
    fn test_username_key_roundtrip() {
        let key = UsernameKey::from("Zoë Example");
        let rendered = key.to_string();
        assert!(is_valid_kv_key(&rendered));
        let parsed: UsernameKey = rendered.parse().unwrap();
        assert_eq!(key, parsed);
    }
}
