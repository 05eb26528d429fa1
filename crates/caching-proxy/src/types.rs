//! Core types for the caching proxy

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_ORIGIN_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// A stored origin response. Never mutated after insertion; a newer
/// response for the same fingerprint replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
            stored_at: Utc::now(),
        }
    }

    /// Whether the entry is older than `ttl` as seen at `now`
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now - self.stored_at > ttl,
            // A TTL too large for chrono never expires anything
            Err(_) => false,
        }
    }
}

/// Provenance marker written into the `X-Cache` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_size: u64,
    pub hits: u64,
    pub misses: u64,
}

/// Configuration for the proxy, validated before it reaches [`crate::serve`]
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub port: u16,
    pub origin: Url,
    pub ttl: Duration,
    pub origin_timeout: Duration,
    pub max_body_bytes: usize,
    pub stats_port: Option<u16>,
}

impl ProxyConfig {
    pub fn new(port: u16, origin: Url, ttl: Duration) -> Self {
        Self {
            port,
            origin,
            ttl,
            origin_timeout: Duration::from_secs(DEFAULT_ORIGIN_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            stats_port: None,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_aged(secs: i64) -> CacheEntry {
        CacheEntry {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"hello"),
            stored_at: Utc::now() - chrono::Duration::seconds(secs),
        }
    }

    #[test]
    fn test_default_config_values() {
        let origin = Url::parse("http://localhost:8080").unwrap();
        let config = ProxyConfig::new(3000, origin, Duration::from_secs(60));
        assert_eq!(config.port, 3000);
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.origin_timeout, Duration::from_secs(30));
        assert_eq!(config.max_body_bytes, 2 * 1024 * 1024);
        assert!(config.stats_port.is_none());
    }

    #[test]
    fn test_entry_expiry() {
        let now = Utc::now();
        assert!(entry_aged(10).is_expired(Duration::from_secs(5), now));
        assert!(!entry_aged(1).is_expired(Duration::from_secs(5), now));
    }

    #[test]
    fn test_entry_exactly_at_ttl_is_kept() {
        let entry = entry_aged(0);
        let now = entry.stored_at + chrono::Duration::seconds(5);
        assert!(!entry.is_expired(Duration::from_secs(5), now));
    }

    #[test]
    fn test_cache_status_strings() {
        assert_eq!(CacheStatus::Hit.as_str(), "HIT");
        assert_eq!(CacheStatus::Miss.as_str(), "MISS");
    }

    #[test]
    fn test_cache_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.total_size, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            uptime_secs: 3600,
            cache: CacheStats {
                entries: 3,
                total_size: 1024,
                hits: 500,
                misses: 50,
            },
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("3600"));
        assert!(json.contains("500"));
    }
}
