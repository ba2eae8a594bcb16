use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use landed_core::{ExchangeRateProvider, ExchangeRateSnapshot, ObservedRates, UpstreamDataError};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Serves rates taken from configuration.
pub struct FixedRateProvider {
    snapshot: ExchangeRateSnapshot,
}

impl FixedRateProvider {
    pub fn new(snapshot: ExchangeRateSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl ExchangeRateProvider for FixedRateProvider {
    async fn current_rates(&self) -> Result<ObservedRates, UpstreamDataError> {
        Ok(ObservedRates {
            snapshot: self.snapshot,
            fetched_at: Utc::now(),
        })
    }
}

/// TTLs beyond what `chrono` can represent mean "never expires".
fn ttl_from_seconds(seconds: u64) -> Duration {
    i64::try_from(seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

/// Caches the last observation of another provider for `ttl`.
///
/// A stale or empty cache is refreshed on the next read. If the source fails
/// the error is returned as is; stale rates are never served.
pub struct CachedRateProvider {
    source: Arc<dyn ExchangeRateProvider>,
    ttl: Duration,
    cached: RwLock<Option<ObservedRates>>,
}

impl CachedRateProvider {
    pub fn new(source: Arc<dyn ExchangeRateProvider>, ttl_seconds: u64) -> Self {
        Self {
            source,
            ttl: ttl_from_seconds(ttl_seconds),
            cached: RwLock::new(None),
        }
    }

    /// Prime the cache at start-up.
    pub async fn init(&self) -> Result<ObservedRates, UpstreamDataError> {
        self.refresh().await
    }

    pub async fn refresh(&self) -> Result<ObservedRates, UpstreamDataError> {
        let observed = self.source.current_rates().await.map_err(|e| {
            warn!("Rate refresh failed: {}", e);
            e
        })?;

        *self.cached.write().await = Some(observed);
        info!(
            eur_usd = observed.snapshot.eur_usd,
            usd_local = observed.snapshot.usd_local,
            "Exchange rates refreshed"
        );
        Ok(observed)
    }

    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
        debug!("Exchange rate cache invalidated");
    }

    pub async fn cached(&self) -> Option<ObservedRates> {
        *self.cached.read().await
    }

    fn is_fresh(&self, observed: &ObservedRates) -> bool {
        Utc::now() - observed.fetched_at < self.ttl
    }
}

#[async_trait]
impl ExchangeRateProvider for CachedRateProvider {
    async fn current_rates(&self) -> Result<ObservedRates, UpstreamDataError> {
        if let Some(observed) = self.cached().await {
            if self.is_fresh(&observed) {
                return Ok(observed);
            }
            debug!("Cached exchange rates expired");
        }
        self.refresh().await
    }
}
