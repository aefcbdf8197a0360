//! Key-value store access for sortie.
//!
//! Talks to an external REST-pipelined key-value store (GET, SET-with-expiry,
//! and EVAL for the atomic rate-limit script) and layers the two consumers on
//! top: the two-tier TTL cache and the per-identity rate limiter. Cache reads
//! degrade to misses and writes are fire-and-forget — only the rate limiter
//! treats an unreachable store as an error, and only outside development.

pub mod cache;
pub mod client;
pub mod error;
pub mod rate_limit;

pub use cache::{detail_key, search_key, TtlCache};
pub use client::KvClient;
pub use error::KvError;
pub use rate_limit::{Decision, IdentityMode, RateLimitCaps, RateLimiter};
