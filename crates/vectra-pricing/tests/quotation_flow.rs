//! End-to-end quotation flow tests
//!
//! Exercise the public service facade against the in-memory reference
//! data, checking both the priced result and the integration log trail.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use vectra_common::{
    IntegrationLogEntry, PricingError, QuotationInput, QuotationStatus, StoreError, Tariff, TollSource, VectraError,
};
use vectra_pricing::lookup::cashback::CASHBACK_ENDPOINT;
use vectra_pricing::lookup::tariff::TARIFF_ENDPOINT;
use vectra_pricing::lookup::tax::TAX_RATE_ENDPOINT;
use vectra_pricing::lookup::TariffQuery;
use vectra_pricing::toll::{TollProviderError, TollRequest, TOLL_ENDPOINT};
use vectra_pricing::{
    InMemoryLogStore, IntegrationLogger, LoggerConfig, PricingConfig, QuotationService, Repositories,
    SimulatedTollProvider, TariffRepository, TaxRateRepository, TollProvider,
};

struct Harness {
    service: QuotationService,
    store: Arc<InMemoryLogStore>,
    consumer: tokio::task::JoinHandle<()>,
}

impl Harness {
    fn new(repositories: impl FnOnce(&PricingConfig) -> Repositories) -> Self {
        let config = PricingConfig::default();
        let store = Arc::new(InMemoryLogStore::new(1_000));
        let (logger, consumer) = IntegrationLogger::spawn(store.clone(), LoggerConfig::default());
        let service = QuotationService::new(&config, repositories(&config), logger);
        Self {
            service,
            store,
            consumer,
        }
    }

    fn reference() -> Self {
        Self::new(|config| {
            let mut repositories = Repositories::reference(config);
            repositories.tolls = Arc::new(SimulatedTollProvider::new(Duration::ZERO, 0.0));
            repositories
        })
    }

    /// Close the logger and wait until every entry has been persisted
    async fn drain(self) -> Vec<IntegrationLogEntry> {
        drop(self.service);
        self.consumer.await.unwrap();
        self.store.entries()
    }
}

fn entries_for<'a>(entries: &'a [IntegrationLogEntry], endpoint: &str) -> Vec<&'a IntegrationLogEntry> {
    entries.iter().filter(|e| e.endpoint == endpoint).collect()
}

struct FailingTariffs;

#[async_trait]
impl TariffRepository for FailingTariffs {
    async fn find(&self, _query: &TariffQuery) -> Result<Vec<Tariff>, StoreError> {
        Err(StoreError::Unavailable("connection reset".into()))
    }
}

struct FailingTaxes;

#[async_trait]
impl TaxRateRepository for FailingTaxes {
    async fn rate(&self, _origin: &str, _destination: &str) -> Result<f64, StoreError> {
        Err(StoreError::Query("function get_icms_rate does not exist".into()))
    }
}

struct DownTolls;

#[async_trait]
impl TollProvider for DownTolls {
    async fn quote(&self, _request: &TollRequest) -> Result<f64, TollProviderError> {
        Err(TollProviderError::Unavailable("503".into()))
    }
}

#[tokio::test]
async fn test_quote_with_informed_toll() {
    let harness = Harness::reference();
    let input = QuotationInput::new("SP", "RJ", 300.0, 12_000.0, 50_000.0)
        .with_name("Santos -> Rio")
        .with_vehicle_type("truck")
        .with_toll(0.0);

    let quotation = harness.service.quote(input).await.unwrap();
    assert_eq!(quotation.status, QuotationStatus::Calculated);
    assert_eq!(quotation.id.get_version_num(), 7);
    assert_eq!(quotation.input.name.as_deref(), Some("Santos -> Rio"));
    assert!((quotation.result.revenue - 1372.4).abs() < 1e-9);
    assert!(quotation.result.is_viable);

    let entries = harness.drain().await;
    // tariff, tax and cashback; no toll call when the toll is informed
    assert_eq!(entries.len(), 3);
    assert_eq!(entries_for(&entries, TARIFF_ENDPOINT)[0].status_code, 200);
    assert_eq!(entries_for(&entries, TAX_RATE_ENDPOINT)[0].status_code, 200);
    assert_eq!(entries_for(&entries, CASHBACK_ENDPOINT).len(), 1);
    assert!(entries_for(&entries, TOLL_ENDPOINT).is_empty());
}

#[tokio::test]
async fn test_quote_with_estimated_toll() {
    let harness = Harness::reference();
    let input = QuotationInput::new("SP", "RJ", 300.0, 12_000.0, 50_000.0).with_vehicle_type("truck");

    let quotation = harness.service.quote(input).await.unwrap();
    assert_eq!(quotation.result.toll_source, TollSource::Estimated);
    // 12.5 per axle × 3 axles × factor 2
    assert_eq!(quotation.result.toll_value, 75.0);
    assert_eq!(quotation.result.total_operational_costs, 75.0);

    let entries = harness.drain().await;
    let toll = entries_for(&entries, TOLL_ENDPOINT);
    assert_eq!(toll.len(), 1);
    assert!(toll[0].is_success());
    assert_eq!(toll[0].request_payload["axle_count"], 3);
}

#[tokio::test(start_paused = true)]
async fn test_toll_outage_degrades_to_zero() {
    let harness = Harness::new(|config| {
        let mut repositories = Repositories::reference(config);
        repositories.tolls = Arc::new(DownTolls);
        repositories
    });
    let input = QuotationInput::new("MG", "BA", 800.0, 20_000.0, 120_000.0).with_vehicle_type("carreta");

    let quotation = harness.service.quote(input).await.unwrap();
    assert_eq!(quotation.result.toll_value, 0.0);
    assert_eq!(quotation.result.toll_source, TollSource::Fallback);
    // developed origin, other destination
    assert_eq!(quotation.result.icms_rate, 7.0);

    let entries = harness.drain().await;
    let toll = entries_for(&entries, TOLL_ENDPOINT);
    assert_eq!(toll.len(), 1);
    assert_eq!(toll[0].status_code, 500);
    // 1s + 2s of backoff between the three attempts
    assert!(toll[0].duration_ms >= 3_000);
}

#[tokio::test]
async fn test_distance_outside_every_band() {
    let harness = Harness::reference();
    let input = QuotationInput::new("SP", "RJ", 100.5, 12_000.0, 50_000.0).with_toll(0.0);

    let err = harness.service.quote(input).await.unwrap_err();
    assert!(matches!(
        err,
        VectraError::Pricing(PricingError::RateNotFound { ref vehicle_type, .. }) if vehicle_type == "truck"
    ));
    assert!(err.is_client_error());

    let entries = harness.drain().await;
    let tariff = entries_for(&entries, TARIFF_ENDPOINT);
    assert_eq!(tariff.len(), 1);
    assert_eq!(tariff[0].status_code, 404);
    // pricing stops at the missing tariff
    assert!(entries_for(&entries, TAX_RATE_ENDPOINT).is_empty());
}

#[tokio::test]
async fn test_tariff_store_outage_is_not_a_missing_rate() {
    let harness = Harness::new(|config| {
        let mut repositories = Repositories::reference(config);
        repositories.tariffs = Arc::new(FailingTariffs);
        repositories
    });
    let input = QuotationInput::new("SP", "RJ", 300.0, 12_000.0, 50_000.0).with_toll(0.0);

    let err = harness.service.quote(input).await.unwrap_err();
    assert!(matches!(err, VectraError::Store(StoreError::Unavailable(_))));
    assert!(!err.is_client_error());
    assert!(err.to_string().contains("connection reset"));

    let entries = harness.drain().await;
    assert_eq!(entries_for(&entries, TARIFF_ENDPOINT)[0].status_code, 500);
}

#[tokio::test]
async fn test_tax_store_failure_uses_fallback_rate() {
    let harness = Harness::new(|config| {
        let mut repositories = Repositories::reference(config);
        repositories.tax_rates = Arc::new(FailingTaxes);
        repositories
    });
    // internal route would be 18% if the table answered
    let input = QuotationInput::new("SP", "SP", 80.0, 5_000.0, 30_000.0).with_toll(0.0);

    let quotation = harness.service.quote(input).await.unwrap();
    assert_eq!(quotation.result.icms_rate, 12.0);

    let entries = harness.drain().await;
    let tax = entries_for(&entries, TAX_RATE_ENDPOINT);
    assert_eq!(tax.len(), 1);
    assert!(!tax[0].is_success());
}

#[tokio::test]
async fn test_manual_freight_skips_rate_table() {
    let harness = Harness::reference();
    let input = QuotationInput::new("PR", "SC", 250.0, 8_000.0, 40_000.0)
        .with_informed_freight(3_000.0)
        .with_operational_costs(200.0, 200.0, 100.0)
        .with_toll(150.0);

    let quotation = harness.service.quote(input).await.unwrap();
    assert_eq!(quotation.result.revenue, 3_000.0);
    assert_eq!(quotation.result.total_operational_costs, 650.0);

    let entries = harness.drain().await;
    assert!(entries_for(&entries, TARIFF_ENDPOINT).is_empty());
}

#[tokio::test]
async fn test_concurrent_quotes_are_independent() {
    let harness = Harness::reference();

    let tasks: Vec<_> = (1..=16)
        .map(|i| {
            let service = harness.service.clone();
            tokio::spawn(async move {
                let input = QuotationInput::new("SP", "RJ", 300.0, 1_000.0 * f64::from(i), 50_000.0).with_toll(0.0);
                service.quote(input).await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        let quotation = task.await.unwrap().unwrap();
        let expected = quotation.input.weight_kg / 1000.0 * 85.2 + 50_000.0 * 0.007;
        assert!((quotation.result.revenue - expected).abs() < 1e-6);
        ids.push(quotation.id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16);

    let entries = harness.drain().await;
    assert_eq!(entries_for(&entries, TARIFF_ENDPOINT).len(), 16);
}
