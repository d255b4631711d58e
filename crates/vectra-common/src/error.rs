//! Error types for Vectra
//!
//! Provides a unified error type and the pricing-domain error variants.
//! Only [`PricingError::RateNotFound`] and [`VectraError::Validation`] are
//! meant to reach callers of the pricing engine; the remaining lookup errors
//! are resolved to defaults inside the lookups themselves.

use thiserror::Error;

/// Result type alias using VectraError
pub type Result<T> = std::result::Result<T, VectraError>;

/// Unified error type for Vectra operations
#[derive(Debug, Error)]
pub enum VectraError {
    // Input validation errors
    #[error("Invalid quotation input: {0}")]
    Validation(String),

    // Pricing errors
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    // Reference data store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VectraError {
    /// Whether the error was caused by the caller's input or missing reference
    /// data rather than by the system itself
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            VectraError::Validation(_) | VectraError::Pricing(PricingError::RateNotFound { .. })
        )
    }
}

/// Pricing calculation errors
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("No active tariff covers {distance_km} km for vehicle type '{vehicle_type}'")]
    RateNotFound { distance_km: f64, vehicle_type: String },

    #[error("Tax rate lookup failed: {0}")]
    TaxLookup(String),

    #[error("Toll service unavailable after {attempts} attempts: {reason}")]
    TollServiceUnavailable { attempts: u32, reason: String },

    #[error("Cashback lookup failed: {0}")]
    CashbackLookup(String),
}

/// Errors raised by reference data repositories and log stores
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },
}

impl From<serde_json::Error> for VectraError {
    fn from(err: serde_json::Error) -> Self {
        VectraError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for VectraError {
    fn from(err: anyhow::Error) -> Self {
        VectraError::Internal(err.to_string())
    }
}
