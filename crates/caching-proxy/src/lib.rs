//! Caching Proxy Library
//!
//! Forwards GET requests to a single origin and serves repeats from an
//! in-memory cache keyed by a fingerprint of path, headers and body.
//! Entries expire on a periodic sweep.

pub mod cache;
pub mod error;
pub mod fingerprint;
pub mod materialize;
pub mod origin;
pub mod server;
pub mod sweeper;
pub mod types;

pub use cache::ResponseCache;
pub use error::{ProxyError, Result};
pub use fingerprint::fingerprint;
pub use origin::{OriginClient, OriginResponse};
pub use server::{create_router, create_stats_router, serve, ServerState, SharedState};
pub use sweeper::spawn_sweeper;
pub use types::*;
