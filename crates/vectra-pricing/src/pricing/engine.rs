//! Quotation pricing engine
//!
//! Resolves the external inputs of a quotation (tariff, ICMS rate, toll,
//! cashback) and hands them to the pure [`formula`](super::formula).

use tracing::{debug, info, instrument, warn};
use vectra_common::{QuotationInput, QuotationResult, Result, Tariff};

use super::formula::{self, ResolvedToll};
use crate::lookup::{CashbackLookup, RateTableLookup, TaxRateLookup};
use crate::toll::TollEstimator;

/// Lotação pricing engine
#[derive(Clone)]
pub struct PricingEngine {
    tariffs: RateTableLookup,
    taxes: TaxRateLookup,
    tolls: TollEstimator,
    cashback: CashbackLookup,
}

impl PricingEngine {
    pub fn new(tariffs: RateTableLookup, taxes: TaxRateLookup, tolls: TollEstimator, cashback: CashbackLookup) -> Self {
        Self {
            tariffs,
            taxes,
            tolls,
            cashback,
        }
    }

    /// Price a quotation.
    ///
    /// Only validation errors and a missing tariff in table mode fail the
    /// call: tax and toll lookups degrade to their fallbacks.
    #[instrument(skip(self, input), fields(origin = %input.origin_uf, destination = %input.destination_uf))]
    pub async fn calculate(&self, input: &QuotationInput) -> Result<QuotationResult> {
        input.validate()?;

        let tariff = self.resolve_tariff(input).await?;
        let icms_rate = self
            .taxes
            .get_tax_rate(&input.origin_uf, &input.destination_uf)
            .await;
        let toll = self.resolve_toll(input).await;

        let result = formula::price(input, tariff.as_ref(), icms_rate, toll);

        self.spawn_cashback(&input.destination_uf);

        info!(
            revenue = result.revenue,
            margin_percent = result.gross_margin_percent,
            viable = result.is_viable,
            "Quotation priced"
        );
        Ok(result)
    }

    async fn resolve_tariff(&self, input: &QuotationInput) -> Result<Option<Tariff>> {
        if !input.use_table {
            debug!("Manual freight, skipping tariff lookup");
            return Ok(None);
        }
        let tariff = self
            .tariffs
            .find_tariff(input.distance_km, input.tariff_vehicle_type())
            .await?;
        Ok(Some(tariff))
    }

    async fn resolve_toll(&self, input: &QuotationInput) -> ResolvedToll {
        if let Some(toll) = input.toll {
            return ResolvedToll::informed(toll);
        }

        let estimate = self
            .tolls
            .estimate_toll(
                &input.origin_uf,
                &input.destination_uf,
                input.vehicle_type.as_deref().unwrap_or_default(),
                input.axle_count(),
            )
            .await;

        match estimate {
            Ok(value) => ResolvedToll::estimated(value),
            Err(e) => {
                warn!(error = %e, "Toll estimate unavailable, counting toll as 0");
                ResolvedToll::fallback()
            }
        }
    }

    /// Cashback is informational; resolved off the pricing path
    fn spawn_cashback(&self, destination: &str) {
        let cashback = self.cashback.clone();
        let destination = destination.to_string();
        tokio::spawn(async move {
            let percentage = cashback.get_cashback(&destination).await;
            debug!(%destination, percentage, "Cashback resolved");
        });
    }
}
