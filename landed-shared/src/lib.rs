pub mod models;
pub mod pii;

pub use models::events::{event_timestamp, PricingEvent, QuoteCalculatedEvent, OverrideChangedEvent, RatesRefreshedEvent};
pub use pii::Masked;
