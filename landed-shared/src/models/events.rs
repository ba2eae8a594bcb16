use uuid::Uuid;

/// Millisecond timestamp stamped on every event.
pub fn event_timestamp() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Emitted after every successful quote, whatever the entry mode.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct QuoteCalculatedEvent {
    pub quote_id: Uuid,
    pub mode: String,
    pub product_code: Option<String>,
    pub category: Option<String>,
    pub landed_cost_local: f64,
    pub final_sale_price_local: f64,
    pub timestamp: i64,
}

/// Emitted when an administrator writes or removes an override scope.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OverrideChangedEvent {
    pub scope: String,
    pub fields: Vec<String>,
    pub deleted: bool,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct RatesRefreshedEvent {
    pub eur_usd: f64,
    pub usd_local: f64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingEvent {
    QuoteCalculated(QuoteCalculatedEvent),
    OverrideChanged(OverrideChangedEvent),
    RatesRefreshed(RatesRefreshedEvent),
}

impl PricingEvent {
    /// Topic name used for SSE event names and log fields.
    pub fn topic(&self) -> &'static str {
        match self {
            PricingEvent::QuoteCalculated(_) => "quote.calculated",
            PricingEvent::OverrideChanged(_) => "override.changed",
            PricingEvent::RatesRefreshed(_) => "rates.refreshed",
        }
    }
}
