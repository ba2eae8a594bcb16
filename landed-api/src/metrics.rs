use axum::extract::State;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::AppError;
use crate::state::AppState;

/// Per-process counters. Each `AppState` owns its own registry.
pub struct Metrics {
    registry: Registry,
    pub quotes: IntCounterVec,
    pub override_writes: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let quotes = IntCounterVec::new(
            Opts::new("landed_quotes_total", "Quotes requested, by mode and outcome"),
            &["mode", "outcome"],
        )?;
        let override_writes = IntCounter::new(
            "landed_override_writes_total",
            "Override scopes written or deleted",
        )?;

        registry.register(Box::new(quotes.clone()))?;
        registry.register(Box::new(override_writes.clone()))?;

        Ok(Self {
            registry,
            quotes,
            override_writes,
        })
    }

    pub fn record_quote(&self, mode: &str, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.quotes.with_label_values(&[mode, outcome]).inc();
    }

    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, AppError> {
    Ok(state.metrics.render()?)
}
