//! The currency conversion contract and its implementations.
//!
//! The engine consumes conversion through the narrow
//! `convert(amount, from, to)` seam; where the rates come from is not this
//! crate's concern. A static table implementation covers seeding and tests,
//! and `CachingConverter` wraps any implementation with a TTL rate cache.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::currency::cache::RateCache;
use crate::currency::conversion::{Conversion, DEFAULT_DECIMAL_PLACES};
use claimflow_shared::types::CurrencyCode;
use claimflow_shared::AppError;

/// Errors surfaced by a conversion backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    /// The conversion service could not be reached.
    #[error("Currency conversion service is unreachable")]
    ServiceUnavailable,

    /// The conversion service answered with something unusable.
    #[error("Currency conversion service returned an invalid response: {0}")]
    BadGateway(String),

    /// The service knows nothing about this currency.
    #[error("Currency {0} is not supported by the exchange service")]
    UnsupportedCurrency(CurrencyCode),
}

impl CurrencyError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ServiceUnavailable => 503,
            Self::BadGateway(_) => 502,
            Self::UnsupportedCurrency(_) => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::BadGateway(_) => "BAD_GATEWAY",
            Self::UnsupportedCurrency(_) => "UNSUPPORTED_CURRENCY",
        }
    }
}

impl From<CurrencyError> for AppError {
    fn from(err: CurrencyError) -> Self {
        match err {
            CurrencyError::UnsupportedCurrency(_) => Self::Validation(err.to_string()),
            CurrencyError::ServiceUnavailable | CurrencyError::BadGateway(_) => {
                Self::ExternalService(err.to_string())
            }
        }
    }
}

/// The conversion contract consumed by the expense store.
#[async_trait]
pub trait CurrencyConverter: Send + Sync {
    /// Converts `amount` from `from` into `to`.
    ///
    /// Same-currency conversions must short-circuit with rate 1 and never
    /// touch a backend.
    async fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Conversion, CurrencyError>;
}

/// Converter backed by a fixed rate table.
///
/// Rates are directional: a `USD -> EUR` entry says how many EUR one USD
/// buys. Used by the seeder and by tests; a deployment would put an
/// API-backed implementation behind the same trait.
#[derive(Debug)]
pub struct StaticRateConverter {
    rates: HashMap<(CurrencyCode, CurrencyCode), Decimal>,
    decimal_places: u32,
}

impl Default for StaticRateConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticRateConverter {
    /// Creates an empty converter rounding to the default two decimals.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rates: HashMap::new(),
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }

    /// Adds a directional rate.
    #[must_use]
    pub fn with_rate(mut self, from: CurrencyCode, to: CurrencyCode, rate: Decimal) -> Self {
        self.rates.insert((from, to), rate);
        self
    }
}

#[async_trait]
impl CurrencyConverter for StaticRateConverter {
    async fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Conversion, CurrencyError> {
        if from == to {
            return Ok(Conversion::identity(amount, self.decimal_places));
        }

        let rate = self
            .rates
            .get(&(from.clone(), to.clone()))
            .copied()
            .ok_or_else(|| CurrencyError::UnsupportedCurrency(from.clone()))?;

        Ok(Conversion::from_rate(amount, rate, self.decimal_places))
    }
}

/// Decorator that consults a `RateCache` before hitting the inner backend.
pub struct CachingConverter<C> {
    inner: C,
    cache: Arc<dyn RateCache>,
    decimal_places: u32,
}

impl<C> CachingConverter<C> {
    /// Wraps `inner` with `cache`.
    pub fn new(inner: C, cache: Arc<dyn RateCache>) -> Self {
        Self {
            inner,
            cache,
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }
}

#[async_trait]
impl<C: CurrencyConverter> CurrencyConverter for CachingConverter<C> {
    async fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Conversion, CurrencyError> {
        if from == to {
            return Ok(Conversion::identity(amount, self.decimal_places));
        }

        if let Some(rate) = self.cache.get(from, to) {
            return Ok(Conversion::from_rate(amount, rate, self.decimal_places));
        }

        let conversion = self.inner.convert(amount, from, to).await?;
        self.cache.insert(from.clone(), to.clone(), conversion.rate);
        Ok(conversion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).expect("valid code")
    }

    fn usd_eur_converter() -> StaticRateConverter {
        StaticRateConverter::new().with_rate(code("USD"), code("EUR"), dec!(0.92))
    }

    #[tokio::test]
    async fn test_same_currency_short_circuits() {
        let converter = StaticRateConverter::new();
        let conversion = converter
            .convert(dec!(42.5), &code("USD"), &code("USD"))
            .await
            .expect("identity conversion");
        assert_eq!(conversion.rate, Decimal::ONE);
        assert_eq!(conversion.converted_amount, dec!(42.50));
    }

    #[tokio::test]
    async fn test_static_rate_applied() {
        let conversion = usd_eur_converter()
            .convert(dec!(100), &code("USD"), &code("EUR"))
            .await
            .expect("conversion");
        assert_eq!(conversion.converted_amount, dec!(92.00));
        assert_eq!(conversion.rate, dec!(0.92));
    }

    #[tokio::test]
    async fn test_unknown_pair_fails() {
        let result = usd_eur_converter()
            .convert(dec!(100), &code("GBP"), &code("EUR"))
            .await;
        assert_eq!(
            result,
            Err(CurrencyError::UnsupportedCurrency(code("GBP")))
        );
    }

    /// Converter that counts backend hits; used to observe caching.
    struct CountingConverter {
        inner: StaticRateConverter,
        hits: AtomicUsize,
    }

    #[async_trait]
    impl CurrencyConverter for Arc<CountingConverter> {
        async fn convert(
            &self,
            amount: Decimal,
            from: &CurrencyCode,
            to: &CurrencyCode,
        ) -> Result<Conversion, CurrencyError> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            self.inner.convert(amount, from, to).await
        }
    }

    /// Cache that never expires, so tests stay clock-free.
    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<(CurrencyCode, CurrencyCode), Decimal>>,
    }

    impl RateCache for MapCache {
        fn get(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<Decimal> {
            self.entries
                .lock()
                .expect("cache lock")
                .get(&(from.clone(), to.clone()))
                .copied()
        }

        fn insert(&self, from: CurrencyCode, to: CurrencyCode, rate: Decimal) {
            self.entries
                .lock()
                .expect("cache lock")
                .insert((from, to), rate);
        }
    }

    #[tokio::test]
    async fn test_caching_converter_hits_backend_once() {
        let counting = Arc::new(CountingConverter {
            inner: usd_eur_converter(),
            hits: AtomicUsize::new(0),
        });
        let caching = CachingConverter::new(Arc::clone(&counting), Arc::new(MapCache::default()));

        let first = caching
            .convert(dec!(100), &code("USD"), &code("EUR"))
            .await
            .expect("first conversion");
        let second = caching
            .convert(dec!(200), &code("USD"), &code("EUR"))
            .await
            .expect("second conversion");

        assert_eq!(first.converted_amount, dec!(92.00));
        assert_eq!(second.converted_amount, dec!(184.00));
        assert_eq!(counting.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_caching_converter_skips_cache_for_same_currency() {
        let counting = Arc::new(CountingConverter {
            inner: StaticRateConverter::new(),
            hits: AtomicUsize::new(0),
        });
        let caching = CachingConverter::new(Arc::clone(&counting), Arc::new(MapCache::default()));

        let conversion = caching
            .convert(dec!(10), &code("EUR"), &code("EUR"))
            .await
            .expect("identity");
        assert_eq!(conversion.rate, Decimal::ONE);
        assert_eq!(counting.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_errors_propagate_through_cache() {
        let counting = Arc::new(CountingConverter {
            inner: StaticRateConverter::new(),
            hits: AtomicUsize::new(0),
        });
        let caching = CachingConverter::new(Arc::clone(&counting), Arc::new(MapCache::default()));

        let result = caching.convert(dec!(10), &code("USD"), &code("JPY")).await;
        assert!(matches!(
            result,
            Err(CurrencyError::UnsupportedCurrency(_))
        ));
    }

    #[test]
    fn test_currency_error_status_codes() {
        assert_eq!(CurrencyError::ServiceUnavailable.status_code(), 503);
        assert_eq!(CurrencyError::BadGateway(String::new()).status_code(), 502);
        assert_eq!(
            CurrencyError::UnsupportedCurrency(code("ZZZ")).status_code(),
            400
        );
    }

    #[test]
    fn test_currency_error_to_app_error() {
        let app: AppError = CurrencyError::ServiceUnavailable.into();
        assert!(matches!(app, AppError::ExternalService(_)));

        let app: AppError = CurrencyError::UnsupportedCurrency(code("ZZZ")).into();
        assert!(matches!(app, AppError::Validation(_)));
    }
}
