//! # Vectra Pricing
//!
//! Lotação freight quotation engine.
//!
//! ## Pricing Formula
//!
//! ```text
//! Revenue = weight_t × price_per_ton + invoice × (freight% + GRIS% + TSO%)
//! Costs   = Operational (incl. toll) + ICMS + PIS/COFINS
//! Margin  = Revenue - Costs
//! ```
//!
//! Where:
//! - the tariff band comes from the rate table (table mode only)
//! - the ICMS rate comes from the region-pair tax table (12% on failure)
//! - the toll is informed, estimated with retries, or counted as 0

pub mod config;
pub mod integration;
pub mod lookup;
pub mod pricing;
pub mod retry;
pub mod toll;

use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;
use vectra_common::{Quotation, QuotationInput, Result};

pub use config::{LogSettings, PricingConfig, TollSettings};
pub use integration::{InMemoryLogStore, IntegrationLogStore, IntegrationLogger, LoggerConfig, LoggerStats};
pub use lookup::{
    CashbackLookup, CashbackRepository, InMemoryCashbackRepository, InMemoryTariffRepository, RateTableLookup,
    RegionalTaxTable, TaxRateLookup, TaxRateRepository, TariffRepository,
};
pub use pricing::PricingEngine;
pub use retry::RetryPolicy;
pub use toll::{SimulatedTollProvider, TollEstimator, TollProvider};

/// Storage backends the engine reads reference data from
#[derive(Clone)]
pub struct Repositories {
    pub tariffs: Arc<dyn TariffRepository>,
    pub tax_rates: Arc<dyn TaxRateRepository>,
    pub cashback: Arc<dyn CashbackRepository>,
    pub tolls: Arc<dyn TollProvider>,
}

impl Repositories {
    /// In-memory reference tables and the simulated toll provider
    pub fn reference(config: &PricingConfig) -> Self {
        Self {
            tariffs: Arc::new(InMemoryTariffRepository::reference()),
            tax_rates: Arc::new(RegionalTaxTable::default()),
            cashback: Arc::new(InMemoryCashbackRepository::reference()),
            tolls: Arc::new(SimulatedTollProvider::new(
                Duration::from_millis(config.toll.latency_ms),
                config.toll.failure_rate,
            )),
        }
    }
}

/// Quotation service
#[derive(Clone)]
pub struct QuotationService {
    engine: PricingEngine,
    logger: IntegrationLogger,
}

impl QuotationService {
    pub fn new(config: &PricingConfig, repositories: Repositories, logger: IntegrationLogger) -> Self {
        let timeout = config.call_timeout();
        let engine = PricingEngine::new(
            RateTableLookup::new(repositories.tariffs, logger.clone(), timeout),
            TaxRateLookup::new(repositories.tax_rates, logger.clone(), timeout),
            TollEstimator::new(repositories.tolls, config.retry_policy(), timeout, logger.clone()),
            CashbackLookup::new(repositories.cashback, logger.clone(), timeout),
        );
        Self { engine, logger }
    }

    /// Price the input and wrap it in a calculated [`Quotation`]
    #[instrument(skip(self, input))]
    pub async fn quote(&self, input: QuotationInput) -> Result<Quotation> {
        let result = self.engine.calculate(&input).await?;
        Ok(Quotation::calculated(input, result))
    }

    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }

    pub fn logger(&self) -> &IntegrationLogger {
        &self.logger
    }
}
