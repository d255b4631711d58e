//! Destination cashback lookup
//!
//! Informational only: the percentage is resolved and logged but never
//! applied to the quotation price.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};
use vectra_common::types::integration_log::STATUS_NOT_FOUND;
use vectra_common::{IntegrationLogEntry, IntegrationMethod, PricingError, StoreError};

use super::with_deadline;
use crate::integration::IntegrationLogger;

/// Endpoint name recorded in integration logs
pub const CASHBACK_ENDPOINT: &str = "cashback_uf";

/// Storage backend for cashback rules
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CashbackRepository: Send + Sync {
    /// Configured percentage for the region, if any
    async fn percentage(&self, region: &str) -> Result<Option<f64>, StoreError>;
}

/// In-memory cashback rules keyed by region
#[derive(Default)]
pub struct InMemoryCashbackRepository {
    rules: DashMap<String, f64>,
}

impl InMemoryCashbackRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cashback rules of the reference configuration
    pub fn reference() -> Self {
        let repository = Self::new();
        for (region, percentage) in [("SP", 1.5), ("RJ", 1.0), ("MG", 1.2), ("SC", 2.0)] {
            repository.set(region, percentage);
        }
        repository
    }

    pub fn set(&self, region: &str, percentage: f64) {
        self.rules.insert(region.trim().to_ascii_uppercase(), percentage);
    }
}

#[async_trait]
impl CashbackRepository for InMemoryCashbackRepository {
    async fn percentage(&self, region: &str) -> Result<Option<f64>, StoreError> {
        Ok(self
            .rules
            .get(&region.trim().to_ascii_uppercase())
            .map(|entry| *entry.value()))
    }
}

/// Cashback lookup; resolves to 0 when nothing applies
#[derive(Clone)]
pub struct CashbackLookup {
    repository: Arc<dyn CashbackRepository>,
    logger: IntegrationLogger,
    timeout: Duration,
}

impl CashbackLookup {
    pub fn new(repository: Arc<dyn CashbackRepository>, logger: IntegrationLogger, timeout: Duration) -> Self {
        Self {
            repository,
            logger,
            timeout,
        }
    }

    /// Cashback percentage for the destination region, 0 if none
    #[instrument(skip(self))]
    pub async fn get_cashback(&self, destination: &str) -> f64 {
        let started = Instant::now();
        let entry = IntegrationLogEntry::new(CASHBACK_ENDPOINT, IntegrationMethod::Select)
            .with_request(json!({ "destination": destination }));

        let outcome = with_deadline(
            CASHBACK_ENDPOINT,
            self.timeout,
            self.repository.percentage(destination),
        )
        .await
        .map_err(|e| PricingError::CashbackLookup(e.to_string()));

        match outcome {
            Ok(Some(percentage)) => {
                debug!(percentage, "Cashback resolved");
                self.logger.log(
                    entry
                        .with_response(json!({ "percentage": percentage }))
                        .with_duration(started.elapsed()),
                );
                percentage
            }
            Ok(None) => {
                debug!("No cashback configured");
                self.logger.log(
                    entry
                        .with_response(json!({ "percentage": 0.0 }))
                        .with_status(STATUS_NOT_FOUND)
                        .with_duration(started.elapsed()),
                );
                0.0
            }
            Err(e) => {
                warn!(error = %e, "Cashback lookup failed, using 0");
                self.logger
                    .log(entry.with_error(e.to_string()).with_duration(started.elapsed()));
                0.0
            }
        }
    }
}
