//! Turns a stored or freshly fetched response into the reply sent to the client

use crate::types::{CacheEntry, CacheStatus};
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::Response,
};

pub const X_CACHE: &str = "x-cache";

/// Connection-scoped headers. The body is re-framed by our own server, so
/// the origin's framing must not be replayed.
fn is_hop_header(name: &str) -> bool {
    matches!(
        name,
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Build the client response: status, every header value (one line per
/// value, never comma-joined), a single `X-Cache` marker, then the body.
pub fn materialize(
    status: StatusCode,
    headers: &HeaderMap,
    body: Bytes,
    cache_status: CacheStatus,
) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    let out = response.headers_mut();
    for (name, value) in headers {
        if is_hop_header(name.as_str()) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out.insert(X_CACHE, HeaderValue::from_static(cache_status.as_str()));

    response
}

/// Replay a cache entry as a HIT
pub fn from_entry(entry: CacheEntry) -> Response {
    materialize(entry.status, &entry.headers, entry.body, CacheStatus::Hit)
}
