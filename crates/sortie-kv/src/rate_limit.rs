//! Per-identity sliding-window admission control.
//!
//! Each identity carries a minute window and a day window; the day window
//! rolls at UTC midnight (the key embeds the UTC date). Both counters are
//! bumped by a server-side script that increments and sets the expiry only
//! on the first increment of a fresh window, as one atomic unit — a naive
//! read-then-write would silently drop the expiry under concurrent requests
//! from the same identity and leak a permanent counter.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::Value;

use crate::client::KvClient;
use crate::error::KvError;

/// Increment, arm the expiry on a fresh window only, and report both the
/// count and the window's remaining lifetime — one round trip, one unit.
const WINDOW_SCRIPT: &str = "local c = redis.call('INCR', KEYS[1]) \
if c == 1 then redis.call('EXPIRE', KEYS[1], ARGV[1]) end \
return {c, redis.call('TTL', KEYS[1])}";

const MINUTE_WINDOW_SECS: u64 = 60;
/// Day keys rotate by embedded UTC date; the expiry is just cleanup.
const DAY_KEY_TTL_SECS: u64 = 90_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityMode {
    Guest,
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied { retry_after_secs: u64 },
}

/// Per-mode request caps. Guests are throttled harder.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitCaps {
    pub guest_per_minute: u32,
    pub guest_per_day: u32,
    pub auth_per_minute: u32,
    pub auth_per_day: u32,
}

impl Default for RateLimitCaps {
    fn default() -> Self {
        Self {
            guest_per_minute: 3,
            guest_per_day: 20,
            auth_per_minute: 10,
            auth_per_day: 120,
        }
    }
}

/// KV-backed rate limiter.
///
/// Without a configured store, `fail_open` (development) admits everything;
/// otherwise admission fails as a configuration error.
#[derive(Clone)]
pub struct RateLimiter {
    client: Option<KvClient>,
    caps: RateLimitCaps,
    fail_open: bool,
}

impl RateLimiter {
    #[must_use]
    pub fn new(client: Option<KvClient>, caps: RateLimitCaps, fail_open: bool) -> Self {
        Self {
            client,
            caps,
            fail_open,
        }
    }

    /// Checks and counts one request for `identity_key`.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::Unconfigured`] when no store is configured and the
    /// deployment does not fail open, or the underlying [`KvError`] when the
    /// store call itself fails in that same mode.
    pub async fn admit(
        &self,
        identity_key: &str,
        mode: IdentityMode,
        now: DateTime<Utc>,
    ) -> Result<Decision, KvError> {
        let Some(client) = &self.client else {
            if self.fail_open {
                return Ok(Decision::Allowed);
            }
            return Err(KvError::Unconfigured);
        };

        let (minute_cap, day_cap) = match mode {
            IdentityMode::Guest => (self.caps.guest_per_minute, self.caps.guest_per_day),
            IdentityMode::Authenticated => (self.caps.auth_per_minute, self.caps.auth_per_day),
        };

        let minute_key = format!("sortie:rl:m:{identity_key}");
        let day_key = format!("sortie:rl:d:{}:{identity_key}", now.format("%Y%m%d"));

        let commands = vec![
            eval_command(&minute_key, MINUTE_WINDOW_SECS),
            eval_command(&day_key, DAY_KEY_TTL_SECS),
        ];

        let results = match client.pipeline(&commands).await {
            Ok(results) => results,
            Err(e) if self.fail_open => {
                tracing::warn!(error = %e, "rate-limit store unreachable; admitting");
                return Ok(Decision::Allowed);
            }
            Err(e) => return Err(e),
        };

        let (minute_count, minute_ttl) = parse_window(results.first())?;
        let (day_count, _) = parse_window(results.get(1))?;

        if minute_count > u64::from(minute_cap) {
            let retry_after_secs = minute_ttl.max(1);
            return Ok(Decision::Denied { retry_after_secs });
        }
        if day_count > u64::from(day_cap) {
            return Ok(Decision::Denied {
                retry_after_secs: secs_until_utc_midnight(now),
            });
        }
        Ok(Decision::Allowed)
    }
}

fn eval_command(key: &str, ttl_secs: u64) -> Vec<String> {
    vec![
        "EVAL".to_owned(),
        WINDOW_SCRIPT.to_owned(),
        "1".to_owned(),
        key.to_owned(),
        ttl_secs.to_string(),
    ]
}

/// Parses a `[count, ttl]` script reply.
fn parse_window(value: Option<&Value>) -> Result<(u64, u64), KvError> {
    let Some(Value::Array(items)) = value else {
        return Err(KvError::Shape(format!(
            "window script returned {value:?}, expected [count, ttl]"
        )));
    };
    let count = items.first().and_then(Value::as_u64);
    // TTL can report -1 for keys without expiry; clamp to 0.
    let ttl = items
        .get(1)
        .and_then(Value::as_i64)
        .map(|t| u64::try_from(t.max(0)).unwrap_or(0));
    match (count, ttl) {
        (Some(count), Some(ttl)) => Ok((count, ttl)),
        _ => Err(KvError::Shape(format!(
            "window script returned {items:?}, expected [count, ttl]"
        ))),
    }
}

/// Seconds until the next UTC midnight, never zero.
fn secs_until_utc_midnight(now: DateTime<Utc>) -> u64 {
    let next_midnight = (now + ChronoDuration::days(1))
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(now);
    let remaining = (next_midnight - now).num_seconds();
    u64::try_from(remaining.max(1)).unwrap_or(1)
}
