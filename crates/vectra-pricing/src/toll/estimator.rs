//! Toll cost estimator
//!
//! Calls the toll provider under a [`RetryPolicy`], bounding each attempt
//! with a deadline. Only the final outcome is written to the integration
//! log, with the duration measured from the first attempt.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};
use vectra_common::{IntegrationLogEntry, IntegrationMethod, PricingError, Result};

use super::provider::{TollProvider, TollProviderError, TollRequest};
use crate::integration::IntegrationLogger;
use crate::retry::{retry, RetryError, RetryPolicy};

/// Endpoint name recorded in integration logs
pub const TOLL_ENDPOINT: &str = "calculate_cost";

/// Toll estimator with retry and backoff
#[derive(Clone)]
pub struct TollEstimator {
    provider: Arc<dyn TollProvider>,
    policy: RetryPolicy,
    attempt_timeout: Duration,
    logger: IntegrationLogger,
}

impl TollEstimator {
    pub fn new(
        provider: Arc<dyn TollProvider>,
        policy: RetryPolicy,
        attempt_timeout: Duration,
        logger: IntegrationLogger,
    ) -> Self {
        Self {
            provider,
            policy,
            attempt_timeout,
            logger,
        }
    }

    /// Estimated toll for the route.
    ///
    /// Fails with [`PricingError::TollServiceUnavailable`] once the retry
    /// budget is exhausted.
    #[instrument(skip(self))]
    pub async fn estimate_toll(
        &self,
        origin: &str,
        destination: &str,
        vehicle_type: &str,
        axle_count: u32,
    ) -> Result<f64> {
        let request = TollRequest {
            origin: origin.to_string(),
            destination: destination.to_string(),
            vehicle_type: vehicle_type.to_string(),
            axle_count,
        };
        let started = Instant::now();

        let outcome = retry(&self.policy, |attempt| {
            let request = &request;
            async move {
                debug!(attempt, "Requesting toll quote");
                self.attempt(request).await
            }
        })
        .await;

        let entry = IntegrationLogEntry::new(TOLL_ENDPOINT, IntegrationMethod::Post)
            .with_request(serde_json::to_value(&request).unwrap_or_default());

        match outcome {
            Ok(cost) => {
                debug!(cost, "Toll estimated");
                self.logger.log(
                    entry
                        .with_response(json!({ "cost": cost }))
                        .with_duration(started.elapsed()),
                );
                Ok(cost)
            }
            Err(RetryError {
                attempts,
                last_error,
            }) => {
                warn!(attempts, error = %last_error, "Toll service unavailable");
                self.logger.log(
                    entry
                        .with_error(last_error.to_string())
                        .with_duration(started.elapsed()),
                );
                Err(PricingError::TollServiceUnavailable {
                    attempts,
                    reason: last_error.to_string(),
                }
                .into())
            }
        }
    }

    /// One provider call under the per-attempt deadline
    async fn attempt(&self, request: &TollRequest) -> std::result::Result<f64, TollProviderError> {
        let cost = tokio::time::timeout(self.attempt_timeout, self.provider.quote(request))
            .await
            .map_err(|_| TollProviderError::Timeout(self.attempt_timeout.as_millis() as u64))??;

        if cost.is_finite() && cost >= 0.0 {
            Ok(cost)
        } else {
            Err(TollProviderError::InvalidResponse(format!("cost {cost}")))
        }
    }
}
