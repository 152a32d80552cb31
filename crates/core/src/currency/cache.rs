//! Injectable TTL cache for exchange-rate lookups.
//!
//! Rate providers are slow and rate-limited, so resolved rates are cached
//! with a bounded time-to-live. The cache is an injected trait object:
//! expiry is owned by the implementation, and tests can substitute a cache
//! that never expires instead of depending on wall-clock time.

use std::time::Duration;

use rust_decimal::Decimal;

use claimflow_shared::types::CurrencyCode;

/// Cache for resolved exchange rates, keyed by currency pair.
pub trait RateCache: Send + Sync {
    /// Looks up a previously stored rate that has not expired.
    fn get(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<Decimal>;

    /// Stores a rate; the implementation decides how long it stays valid.
    fn insert(&self, from: CurrencyCode, to: CurrencyCode, rate: Decimal);
}

/// TTL rate cache backed by `moka`.
pub struct MokaRateCache {
    inner: moka::sync::Cache<(CurrencyCode, CurrencyCode), Decimal>,
}

impl MokaRateCache {
    /// Creates a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: moka::sync::Cache::builder()
                .max_capacity(1024)
                .time_to_live(ttl)
                .build(),
        }
    }
}

impl RateCache for MokaRateCache {
    fn get(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<Decimal> {
        self.inner.get(&(from.clone(), to.clone()))
    }

    fn insert(&self, from: CurrencyCode, to: CurrencyCode, rate: Decimal) {
        self.inner.insert((from, to), rate);
    }
}
