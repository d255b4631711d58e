//! Toll (vale-pedágio) service clients

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Toll quote request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TollRequest {
    pub origin: String,
    pub destination: String,
    pub vehicle_type: String,
    pub axle_count: u32,
}

/// Transient failures of a single toll service call
#[derive(Debug, Clone, Error)]
pub enum TollProviderError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Remote toll cost service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TollProvider: Send + Sync {
    /// Toll cost for the route
    async fn quote(&self, request: &TollRequest) -> Result<f64, TollProviderError>;
}

/// Stand-in for the vale-pedágio API.
///
/// Prices `base_rate_per_axle × axles × distance_factor`, where the distance
/// factor is a proxy derived from the route names. Calls take `latency` and
/// fail with probability `failure_rate`.
#[derive(Debug, Clone)]
pub struct SimulatedTollProvider {
    pub base_rate_per_axle: f64,
    pub latency: Duration,
    pub failure_rate: f64,
}

impl SimulatedTollProvider {
    /// `failure_rate` is clamped to `[0, 1]`; a non-finite rate never fails
    pub fn new(latency: Duration, failure_rate: f64) -> Self {
        let failure_rate = if failure_rate.is_finite() {
            failure_rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            base_rate_per_axle: 12.5,
            latency,
            failure_rate,
        }
    }

    /// Deterministic cost for a request, rounded to cents
    pub fn cost_for(&self, request: &TollRequest) -> f64 {
        let origin = request.origin.trim();
        let destination = request.destination.trim();
        if origin.eq_ignore_ascii_case(destination) {
            return 0.0;
        }

        let distance_factor =
            (origin.chars().count() as f64 - destination.chars().count() as f64).abs() + 2.0;
        let cost = self.base_rate_per_axle * f64::from(request.axle_count) * distance_factor;
        (cost * 100.0).round() / 100.0
    }
}

impl Default for SimulatedTollProvider {
    fn default() -> Self {
        Self::new(Duration::from_millis(600), 0.05)
    }
}

#[async_trait]
impl TollProvider for SimulatedTollProvider {
    async fn quote(&self, request: &TollRequest) -> Result<f64, TollProviderError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let unavailable = rand::thread_rng().gen_bool(self.failure_rate);
        if unavailable {
            return Err(TollProviderError::Unavailable(
                "service unavailable (simulated)".to_string(),
            ));
        }
        Ok(self.cost_for(request))
    }
}
