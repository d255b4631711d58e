//! # Vectra Common
//!
//! Shared types, errors, and pricing constants for the Vectra freight
//! quotation engine.
//!
//! ## Core Types
//!
//! - [`QuotationInput`]: route, cargo and cost inputs of a quotation
//! - [`QuotationResult`]: revenue, itemized taxes, margins and viability
//! - [`Quotation`]: a priced quotation record handed to the caller
//! - [`Tariff`]: distance-banded lotação tariff row
//! - [`IntegrationLogEntry`]: audit record of one external lookup

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{PricingError, Result, StoreError, VectraError};
pub use types::{
    integration_log::{IntegrationLogEntry, IntegrationMethod},
    quotation::{
        axle_count, CargoType, Quotation, QuotationInput, QuotationResult, QuotationStatus,
        TollSource, DEFAULT_VEHICLE_TYPE,
    },
    tariff::Tariff,
};

/// Vectra version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum gross margin percentage for a viable quotation
pub const VIABILITY_THRESHOLD_PERCENT: f64 = 10.0;

/// Share of gross margin left after administrative overhead (15%)
pub const NET_MARGIN_FACTOR: f64 = 0.85;

/// PIS rate over revenue (0.65%)
pub const PIS_RATE: f64 = 0.0065;

/// COFINS rate over revenue (3%)
pub const COFINS_RATE: f64 = 0.03;

/// Combined PIS/COFINS rate used in the cost total (3.65%)
pub const PIS_COFINS_RATE: f64 = 0.0365;

/// ICMS percentage used when the tax lookup fails
pub const FALLBACK_TAX_RATE: f64 = 12.0;

/// Deadline for a single external call in milliseconds
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 10_000;

/// Attempts made against the toll service before giving up
pub const TOLL_MAX_ATTEMPTS: u32 = 3;

/// First backoff delay of the toll service in milliseconds
pub const TOLL_BASE_DELAY_MS: u64 = 1_000;
