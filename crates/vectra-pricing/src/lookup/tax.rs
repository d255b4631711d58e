//! ICMS tax rate lookup
//!
//! Never fails: any repository error, timeout or unusable rate resolves to
//! [`FALLBACK_TAX_RATE`] so pricing never blocks on this lookup.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};
use vectra_common::{IntegrationLogEntry, IntegrationMethod, PricingError, StoreError, FALLBACK_TAX_RATE};

use super::with_deadline;
use crate::integration::IntegrationLogger;

/// Endpoint name recorded in integration logs
pub const TAX_RATE_ENDPOINT: &str = "get_icms_rate";

/// Storage backend for ICMS rates
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaxRateRepository: Send + Sync {
    /// Rate in percent for the origin/destination pair
    async fn rate(&self, origin: &str, destination: &str) -> Result<f64, StoreError>;
}

/// Region-pair ICMS table
#[derive(Debug, Clone)]
pub struct RegionalTaxTable {
    /// Origin and destination in the same region
    pub internal_rate: f64,
    /// Both regions in the developed set
    pub developed_rate: f64,
    /// Developed origin, other destination
    pub developed_to_other_rate: f64,
    /// Any other origin
    pub default_rate: f64,
    developed: HashSet<String>,
}

impl RegionalTaxTable {
    pub fn new(developed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            internal_rate: 18.0,
            developed_rate: 12.0,
            developed_to_other_rate: 7.0,
            default_rate: 12.0,
            developed: developed
                .into_iter()
                .map(|r| r.into().trim().to_ascii_uppercase())
                .collect(),
        }
    }

    pub fn is_developed(&self, region: &str) -> bool {
        self.developed.contains(&normalize(region))
    }

    /// Rate for a pair, regions compared case-insensitively
    pub fn rate_for(&self, origin: &str, destination: &str) -> f64 {
        let (origin, destination) = (normalize(origin), normalize(destination));
        if origin == destination {
            return self.internal_rate;
        }
        match (self.developed.contains(&origin), self.developed.contains(&destination)) {
            (true, true) => self.developed_rate,
            (true, false) => self.developed_to_other_rate,
            _ => self.default_rate,
        }
    }
}

impl Default for RegionalTaxTable {
    fn default() -> Self {
        Self::new(["SP", "RJ", "MG", "RS", "SC", "PR"])
    }
}

#[async_trait]
impl TaxRateRepository for RegionalTaxTable {
    async fn rate(&self, origin: &str, destination: &str) -> Result<f64, StoreError> {
        Ok(self.rate_for(origin, destination))
    }
}

fn normalize(region: &str) -> String {
    region.trim().to_ascii_uppercase()
}

/// ICMS rate lookup with fallback
#[derive(Clone)]
pub struct TaxRateLookup {
    repository: Arc<dyn TaxRateRepository>,
    logger: IntegrationLogger,
    timeout: Duration,
}

impl TaxRateLookup {
    pub fn new(repository: Arc<dyn TaxRateRepository>, logger: IntegrationLogger, timeout: Duration) -> Self {
        Self {
            repository,
            logger,
            timeout,
        }
    }

    /// ICMS percentage for the pair (e.g. `12.0`), or the fallback rate
    #[instrument(skip(self))]
    pub async fn get_tax_rate(&self, origin: &str, destination: &str) -> f64 {
        let started = Instant::now();
        let entry = IntegrationLogEntry::new(TAX_RATE_ENDPOINT, IntegrationMethod::Rpc).with_request(json!({
            "origin": origin,
            "destination": destination,
        }));

        let outcome = with_deadline(
            TAX_RATE_ENDPOINT,
            self.timeout,
            self.repository.rate(origin, destination),
        )
        .await
        .map_err(|e| PricingError::TaxLookup(e.to_string()))
        .and_then(|rate| {
            if rate.is_finite() && rate >= 0.0 {
                Ok(rate)
            } else {
                Err(PricingError::TaxLookup(format!("unusable rate {rate}")))
            }
        });

        match outcome {
            Ok(rate) => {
                debug!(rate, "Tax rate resolved");
                self.logger.log(
                    entry
                        .with_response(json!({ "rate": rate }))
                        .with_duration(started.elapsed()),
                );
                rate
            }
            Err(e) => {
                warn!(error = %e, fallback = FALLBACK_TAX_RATE, "Using fallback tax rate");
                self.logger
                    .log(entry.with_error(e.to_string()).with_duration(started.elapsed()));
                FALLBACK_TAX_RATE
            }
        }
    }
}
