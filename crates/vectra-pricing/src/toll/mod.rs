//! Toll estimation
//!
//! - TollProvider: remote toll cost service (simulated by default)
//! - TollEstimator: retry/backoff wrapper logging the final outcome

pub mod estimator;
pub mod provider;

pub use estimator::{TollEstimator, TOLL_ENDPOINT};
pub use provider::{SimulatedTollProvider, TollProvider, TollProviderError, TollRequest};
