//! Reference data lookups
//!
//! Each lookup wraps an injected repository trait, bounds the call with a
//! deadline and records one integration log entry per call:
//! - RateTableLookup: lotação tariff band for a distance (hard failure)
//! - TaxRateLookup: ICMS rate for a region pair (falls back to 12%)
//! - CashbackLookup: destination cashback percentage (falls back to 0)

pub mod cashback;
pub mod tariff;
pub mod tax;

use std::future::Future;
use std::time::Duration;

use vectra_common::StoreError;

pub use cashback::{CashbackLookup, CashbackRepository, InMemoryCashbackRepository};
pub use tariff::{InMemoryTariffRepository, RateTableLookup, TariffQuery, TariffRepository, VersionOrder};
pub use tax::{RegionalTaxTable, TaxRateLookup, TaxRateRepository};

/// Await a repository call, failing with [`StoreError::Timeout`] past the deadline
pub(crate) async fn with_deadline<T, F>(operation: &str, timeout: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout {
            operation: operation.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}
