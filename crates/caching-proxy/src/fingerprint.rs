//! Cache key derivation
//!
//! A fingerprint is the hex-encoded SHA-256 of the request path, every
//! header name followed by its values, and the raw body. Header names are
//! visited in sorted order so that two requests carrying the same headers
//! always hash the same, whatever order they arrived in.

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

/// Length of a fingerprint in hex characters
pub const FINGERPRINT_LEN: usize = 64;

/// Derive the cache key for a request
pub fn fingerprint(path: &str, headers: &HeaderMap, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());

    let mut names: Vec<&str> = headers.keys().map(|name| name.as_str()).collect();
    names.sort_unstable();

    for name in names {
        hasher.update(name.as_bytes());
        // Values of a repeated header are joined with no separator, in arrival order
        for value in headers.get_all(name) {
            hasher.update(value.as_bytes());
        }
    }

    hasher.update(body);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let h = headers(&[("accept", "text/plain")]);
        let key1 = fingerprint("/x", &h, b"");
        let key2 = fingerprint("/x", &h, b"");
        assert_eq!(key1, key2);
        assert_eq!(key1.len(), FINGERPRINT_LEN);
        assert!(key1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fingerprint_matches_plain_sha256() {
        let h = headers(&[("b", "2"), ("a", "1")]);
        let expected = hex::encode(Sha256::digest(b"/patha1b2body"));
        assert_eq!(fingerprint("/path", &h, b"body"), expected);
    }

    #[test]
    fn test_header_insertion_order_does_not_matter() {
        let h1 = headers(&[("accept", "text/plain"), ("user-agent", "curl")]);
        let h2 = headers(&[("user-agent", "curl"), ("accept", "text/plain")]);
        assert_eq!(fingerprint("/x", &h1, b""), fingerprint("/x", &h2, b""));
    }

    #[test]
    fn test_value_order_within_header_matters() {
        let h1 = headers(&[("accept", "a"), ("accept", "b")]);
        let h2 = headers(&[("accept", "b"), ("accept", "a")]);
        assert_ne!(fingerprint("/x", &h1, b""), fingerprint("/x", &h2, b""));
    }

    #[test]
    fn test_different_inputs_produce_different_keys() {
        let h = headers(&[("accept", "text/plain")]);
        let base = fingerprint("/x", &h, b"");

        assert_ne!(base, fingerprint("/y", &h, b""));
        assert_ne!(base, fingerprint("/x", &h, b"payload"));
        assert_ne!(
            base,
            fingerprint("/x", &headers(&[("accept", "text/html")]), b"")
        );
        assert_ne!(base, fingerprint("/x", &HeaderMap::new(), b""));
    }
}
