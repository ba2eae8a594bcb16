use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UpstreamDataError;

/// Observed exchange rates used for one calculation. Never buffered here:
/// the calculator applies buffers itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateSnapshot {
    /// USD per EUR
    pub eur_usd: f64,
    /// Local currency units per USD
    pub usd_local: f64,
}

impl ExchangeRateSnapshot {
    pub fn new(eur_usd: f64, usd_local: f64) -> Self {
        Self { eur_usd, usd_local }
    }
}

/// A snapshot with the instant it was obtained, as handed out by rate feeds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedRates {
    #[serde(flatten)]
    pub snapshot: ExchangeRateSnapshot,
    pub fetched_at: DateTime<Utc>,
}

/// Source of current rates. Implementations live outside the engine
/// (static configuration, market data feeds, caches over either).
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    async fn current_rates(&self) -> Result<ObservedRates, UpstreamDataError>;
}
