//! Quotation pricing
//!
//! - formula: pure lotação arithmetic over resolved inputs
//! - engine: resolves tariff, tax, toll and cashback, then prices

pub mod engine;
pub mod formula;

pub use engine::PricingEngine;
pub use formula::{ResolvedToll, TariffRevenue, TaxBreakdown};
