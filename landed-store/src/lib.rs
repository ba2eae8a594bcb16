pub mod app_config;
pub mod events;
pub mod memory_repo;
pub mod rates;
pub mod seed;

pub use app_config::Config;
pub use events::EventPublisher;
pub use memory_repo::{InMemoryOverrideRepository, InMemoryProductRepository};
pub use rates::{CachedRateProvider, FixedRateProvider};
pub use seed::{SeedDocument, SeedError};
