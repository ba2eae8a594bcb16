//! Parameter resolution, the landed-cost pipeline and its presentation.

pub mod formatter;
pub mod overrides;
pub mod pricing;
pub mod product;
pub mod quote;

pub use formatter::{PricingResultFormatter, QuoteBreakdown, QuoteSummary, Stage};
pub use overrides::{EffectiveParameterSet, OverrideResolver};
pub use pricing::{CalculationResult, LandedCostCalculator};
pub use product::{Product, ProductRepository};
pub use quote::{Quote, QuoteBasis, QuoteMode, QuoteRequest, QuoteService, AD_HOC_LABEL};
