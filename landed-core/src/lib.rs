//! Value types and collaborator contracts for the landed-cost quoting engine.
//!
//! Percentages are decimals everywhere in this crate except [`ingest::UserParameterInput`],
//! which is the single place user-entered percents are converted.

pub mod error;
pub mod ingest;
pub mod params;
pub mod rates;
pub mod repository;
pub mod scope;

pub use error::{
    ConfigurationError, CoreError, CoreResult, UpstreamDataError, ValidationError, Violation,
    ViolationKind,
};
pub use ingest::UserParameterInput;
pub use params::{ParameterField, ParameterSet, PartialParameterSet};
pub use rates::{ExchangeRateProvider, ExchangeRateSnapshot, ObservedRates};
pub use repository::OverrideRepository;
pub use scope::{OverrideScope, ScopeKey, ScopeKeyError, ScopeLevel, ScopeSet};
