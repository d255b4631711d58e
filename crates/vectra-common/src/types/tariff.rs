//! Lotação tariff rows
//!
//! Each row maps an inclusive distance band to the per-ton price and the
//! percentages charged over the invoice value. Rows are versioned by
//! `version_date`; only active rows take part in lookups.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Distance-banded tariff row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    /// Lower bound of the band in km (inclusive)
    pub distance_min: f64,
    /// Upper bound of the band in km (inclusive)
    pub distance_max: f64,
    /// Price per ton of cargo
    pub price_per_ton: f64,
    /// Freight-value percentage over the invoice value
    pub freight_value_percent: f64,
    /// GRIS (cargo insurance) percentage over the invoice value
    pub gris_percent: f64,
    /// TSO percentage over the invoice value
    pub tso_percent: f64,
    /// Effective date of the table version this row belongs to
    pub version_date: NaiveDate,
    pub is_active: bool,
}

impl Tariff {
    /// Create an active row dated at the Unix epoch
    pub fn new(
        distance_min: f64,
        distance_max: f64,
        price_per_ton: f64,
        freight_value_percent: f64,
        gris_percent: f64,
        tso_percent: f64,
    ) -> Self {
        Self {
            distance_min,
            distance_max,
            price_per_ton,
            freight_value_percent,
            gris_percent,
            tso_percent,
            version_date: NaiveDate::default(),
            is_active: true,
        }
    }

    pub fn with_version_date(mut self, version_date: NaiveDate) -> Self {
        self.version_date = version_date;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Whether the band contains the given distance
    pub fn covers(&self, distance_km: f64) -> bool {
        self.distance_min <= distance_km && distance_km <= self.distance_max
    }
}
