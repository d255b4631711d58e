//! Lotação rate table lookup
//!
//! Resolves the active tariff band containing a distance. The query asks the
//! repository for newest-first ordering by version date, and the lookup takes
//! the first row returned.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};
use vectra_common::types::integration_log::STATUS_NOT_FOUND;
use vectra_common::{IntegrationLogEntry, IntegrationMethod, PricingError, Result, StoreError, Tariff, VectraError};

use super::with_deadline;
use crate::integration::IntegrationLogger;

/// Endpoint name recorded in integration logs
pub const TARIFF_ENDPOINT: &str = "ntc_lotacao";

/// Ordering of tariff versions in a query result; callers must request
/// one explicitly rather than rely on store order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOrder {
    /// Most recent `version_date` first
    NewestFirst,
}

/// Tariff repository query
#[derive(Debug, Clone, PartialEq)]
pub struct TariffQuery {
    pub distance_km: f64,
    /// Informational; bands are shared by all vehicle types
    pub vehicle_type: String,
    pub active_only: bool,
    pub order: VersionOrder,
    pub limit: Option<usize>,
}

impl TariffQuery {
    /// Newest active row covering the distance
    pub fn newest_active(distance_km: f64, vehicle_type: impl Into<String>) -> Self {
        Self {
            distance_km,
            vehicle_type: vehicle_type.into(),
            active_only: true,
            order: VersionOrder::NewestFirst,
            limit: Some(1),
        }
    }
}

/// Storage backend for tariff rows
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TariffRepository: Send + Sync {
    /// Rows whose band covers `query.distance_km`, filtered and ordered as asked
    async fn find(&self, query: &TariffQuery) -> std::result::Result<Vec<Tariff>, StoreError>;
}

/// In-memory tariff table
#[derive(Default)]
pub struct InMemoryTariffRepository {
    rows: Vec<Tariff>,
}

impl InMemoryTariffRepository {
    pub fn new(rows: Vec<Tariff>) -> Self {
        Self {
            rows,
        }
    }

    /// The NTC lotação table in effect since 2024-01-01
    pub fn reference() -> Self {
        let version = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        Self::new(vec![
            Tariff::new(0.0, 100.0, 45.5, 0.5, 0.2, 0.1).with_version_date(version),
            Tariff::new(101.0, 500.0, 85.2, 0.4, 0.2, 0.1).with_version_date(version),
            Tariff::new(501.0, 1000.0, 120.0, 0.3, 0.15, 0.1).with_version_date(version),
            Tariff::new(1001.0, 5000.0, 250.0, 0.2, 0.1, 0.05).with_version_date(version),
        ])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl TariffRepository for InMemoryTariffRepository {
    async fn find(&self, query: &TariffQuery) -> std::result::Result<Vec<Tariff>, StoreError> {
        let mut matches: Vec<Tariff> = self
            .rows
            .iter()
            .filter(|t| !query.active_only || t.is_active)
            .filter(|t| t.covers(query.distance_km))
            .cloned()
            .collect();

        match query.order {
            VersionOrder::NewestFirst => matches.sort_by(|a, b| b.version_date.cmp(&a.version_date)),
        }
        if let Some(limit) = query.limit {
            matches.truncate(limit);
        }
        Ok(matches)
    }
}

/// Rate table lookup
#[derive(Clone)]
pub struct RateTableLookup {
    repository: Arc<dyn TariffRepository>,
    logger: IntegrationLogger,
    timeout: Duration,
}

impl RateTableLookup {
    pub fn new(repository: Arc<dyn TariffRepository>, logger: IntegrationLogger, timeout: Duration) -> Self {
        Self {
            repository,
            logger,
            timeout,
        }
    }

    /// Find the tariff band covering `distance_km`.
    ///
    /// Fails with [`PricingError::RateNotFound`] when no active band matches,
    /// and with [`VectraError::Store`] when the table cannot be read.
    #[instrument(skip(self))]
    pub async fn find_tariff(&self, distance_km: f64, vehicle_type: &str) -> Result<Tariff> {
        let started = Instant::now();
        let query = TariffQuery::newest_active(distance_km, vehicle_type);
        let entry = IntegrationLogEntry::new(TARIFF_ENDPOINT, IntegrationMethod::Select).with_request(json!({
            "distance_km": distance_km,
            "vehicle_type": vehicle_type,
        }));

        let outcome = with_deadline(TARIFF_ENDPOINT, self.timeout, self.repository.find(&query)).await;

        match outcome.map(|rows| rows.into_iter().next()) {
            Ok(Some(tariff)) => {
                debug!(
                    band_min = tariff.distance_min,
                    band_max = tariff.distance_max,
                    version = %tariff.version_date,
                    "Tariff found"
                );
                self.logger.log(
                    entry
                        .with_response(serde_json::to_value(&tariff).unwrap_or_default())
                        .with_duration(started.elapsed()),
                );
                Ok(tariff)
            }
            Ok(None) => {
                debug!("No active tariff covers distance");
                self.logger.log(
                    entry
                        .with_error("no active tariff covers this distance")
                        .with_status(STATUS_NOT_FOUND)
                        .with_duration(started.elapsed()),
                );
                Err(rate_not_found(distance_km, vehicle_type))
            }
            Err(e) => {
                warn!(error = %e, "Tariff table lookup failed");
                self.logger
                    .log(entry.with_error(e.to_string()).with_duration(started.elapsed()));
                Err(VectraError::Store(e))
            }
        }
    }
}

fn rate_not_found(distance_km: f64, vehicle_type: &str) -> VectraError {
    PricingError::RateNotFound {
        distance_km,
        vehicle_type: vehicle_type.to_string(),
    }
    .into()
}
