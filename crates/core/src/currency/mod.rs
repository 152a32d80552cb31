//! Multi-currency support for Claimflow.
//!
//! Expenses are captured in the currency they were paid in and stored
//! alongside their value in the company's base currency. The workflow
//! engine itself never converts anything; conversion happens once, before
//! an expense row enters the approval pipeline.
//!
//! # Modules
//!
//! - `conversion` - Rounding-safe conversion arithmetic
//! - `service` - The `convert(amount, from, to)` contract and implementations
//! - `cache` - Injectable TTL cache for exchange-rate lookups

pub mod cache;
pub mod conversion;
pub mod service;

pub use cache::{MokaRateCache, RateCache};
pub use conversion::{Conversion, convert_amount, DEFAULT_DECIMAL_PLACES};
pub use service::{CachingConverter, CurrencyConverter, CurrencyError, StaticRateConverter};
