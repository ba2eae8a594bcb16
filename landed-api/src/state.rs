use std::sync::Arc;

use landed_catalog::{PricingResultFormatter, ProductRepository, QuoteService};
use landed_core::{ExchangeRateSnapshot, OverrideRepository, UpstreamDataError};
use landed_store::{
    CachedRateProvider, Config, EventPublisher, FixedRateProvider, InMemoryOverrideRepository,
    InMemoryProductRepository, SeedDocument, SeedError,
};

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub quotes: Arc<QuoteService>,
    pub overrides: Arc<dyn OverrideRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub rates: Arc<CachedRateProvider>,
    pub formatter: Arc<PricingResultFormatter>,
    pub events: EventPublisher,
    pub metrics: Arc<Metrics>,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error(transparent)]
    Rates(#[from] UpstreamDataError),
    #[error("Failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl AppState {
    /// Wire in-memory stores, the rate cache and the quote service from configuration.
    pub async fn build(config: &Config, seed: &SeedDocument) -> Result<Self, StartupError> {
        let overrides: Arc<dyn OverrideRepository> = Arc::new(InMemoryOverrideRepository::new());
        let products: Arc<dyn ProductRepository> = Arc::new(InMemoryProductRepository::new());
        seed.apply(overrides.as_ref(), products.as_ref()).await?;

        let fixed = FixedRateProvider::new(ExchangeRateSnapshot::new(
            config.rates.eur_usd,
            config.rates.usd_local,
        ));
        let rates = Arc::new(CachedRateProvider::new(
            Arc::new(fixed),
            config.rates.cache_ttl_seconds,
        ));
        rates.init().await?;

        let quotes = QuoteService::new(overrides.clone(), products.clone(), rates.clone())
            .with_defaults(seed.ingested_defaults());

        Ok(Self {
            quotes: Arc::new(quotes),
            overrides,
            products,
            rates,
            formatter: Arc::new(PricingResultFormatter::new(
                config.quoting.local_currency.clone(),
                config.quoting.display_decimals,
            )),
            events: EventPublisher::new(config.server.event_capacity),
            metrics: Arc::new(Metrics::new()?),
        })
    }
}
