use std::sync::Arc;

use chrono::{DateTime, Utc};
use landed_core::{
    CoreError, CoreResult, ExchangeRateProvider, ExchangeRateSnapshot, OverrideRepository,
    ParameterSet, PartialParameterSet, ScopeKey, ScopeSet,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::overrides::{EffectiveParameterSet, OverrideResolver};
use crate::pricing::{CalculationResult, LandedCostCalculator};
use crate::product::ProductRepository;

/// Attribution label used when parameters do not come from a catalog product.
pub const AD_HOC_LABEL: &str = "ad-hoc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteMode {
    /// Caller supplies every parameter.
    Manual,
    /// Parameters come from the global, category and product scopes of a catalog product.
    Product,
    /// Stored global and category scopes, caller parameters on top.
    Category,
}

impl QuoteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteMode::Manual => "manual",
            QuoteMode::Product => "product",
            QuoteMode::Category => "category",
        }
    }
}

/// How the parameter layers of a quote are assembled. Already ingested:
/// percentages are decimals.
#[derive(Debug, Clone)]
pub enum QuoteBasis {
    Manual { params: PartialParameterSet },
    Product { code: String },
    Category { name: String, params: PartialParameterSet },
}

impl QuoteBasis {
    pub fn mode(&self) -> QuoteMode {
        match self {
            QuoteBasis::Manual { .. } => QuoteMode::Manual,
            QuoteBasis::Product { .. } => QuoteMode::Product,
            QuoteBasis::Category { .. } => QuoteMode::Category,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub basis: QuoteBasis,
    /// Rates pinned by the caller; the configured provider is used otherwise.
    pub rates: Option<ExchangeRateSnapshot>,
}

/// A completed quote: what went in, where it came from, and every pipeline value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub mode: QuoteMode,
    pub effective: EffectiveParameterSet,
    pub params: ParameterSet,
    pub rates: ExchangeRateSnapshot,
    /// Set when rates came from the provider rather than the request.
    pub rates_observed_at: Option<DateTime<Utc>>,
    pub result: CalculationResult,
}

/// Runs the three quoting entry points through the single pipeline.
pub struct QuoteService {
    overrides: Arc<dyn OverrideRepository>,
    products: Arc<dyn ProductRepository>,
    rates: Arc<dyn ExchangeRateProvider>,
    defaults: PartialParameterSet,
    resolver: OverrideResolver,
    calculator: LandedCostCalculator,
}

impl QuoteService {
    pub fn new(
        overrides: Arc<dyn OverrideRepository>,
        products: Arc<dyn ProductRepository>,
        rates: Arc<dyn ExchangeRateProvider>,
    ) -> Self {
        Self {
            overrides,
            products,
            rates,
            defaults: PartialParameterSet::new(),
            resolver: OverrideResolver::new(),
            calculator: LandedCostCalculator::new(),
        }
    }

    /// Boundary defaults placed beneath the global scope of every quote.
    pub fn with_defaults(mut self, defaults: PartialParameterSet) -> Self {
        self.defaults = defaults;
        self
    }

    pub async fn quote(&self, request: QuoteRequest) -> CoreResult<Quote> {
        let mode = request.basis.mode();
        let effective = self.effective_parameters(request.basis).await?;
        let params = effective.require_complete()?;

        let (rates, rates_observed_at) = match request.rates {
            Some(pinned) => (pinned, None),
            None => {
                let observed = self.rates.current_rates().await?;
                (observed.snapshot, Some(observed.fetched_at))
            }
        };

        let result = self.calculator.calculate(params, rates)?;
        info!(
            mode = mode.as_str(),
            product = %effective.product_code,
            landed_cost_local = result.landed_cost_local,
            "Quote calculated"
        );

        Ok(Quote {
            mode,
            effective,
            params,
            rates,
            rates_observed_at,
            result,
        })
    }

    /// Merge the layers for a basis without calculating. Used by audit views.
    pub async fn effective_parameters(&self, basis: QuoteBasis) -> CoreResult<EffectiveParameterSet> {
        let (product_code, category, scopes) = match basis {
            QuoteBasis::Manual { params } => (
                AD_HOC_LABEL.to_string(),
                AD_HOC_LABEL.to_string(),
                ScopeSet::new().with_product(params),
            ),
            QuoteBasis::Product { code } => {
                let product = self
                    .products
                    .get_product(&code)
                    .await?
                    .filter(|p| p.is_quotable())
                    .ok_or_else(|| CoreError::NotFound(format!("product {}", code)))?;

                let scopes = self
                    .stored_scopes(Some(&product.code), &product.category)
                    .await?;
                (product.code, product.category, scopes)
            }
            QuoteBasis::Category { name, params } => {
                let name = name.trim().to_string();
                let mut scopes = self.stored_scopes(None, &name).await?;
                scopes.product = Some(params);
                (AD_HOC_LABEL.to_string(), name, scopes)
            }
        };

        let scopes = scopes.with_defaults(&self.defaults);
        debug!(product = %product_code, category = %category, "Resolving parameter scopes");
        Ok(self.resolver.resolve(&product_code, &category, &scopes))
    }

    /// Stored layers for a category, plus the product layer when quoting a catalog product.
    async fn stored_scopes(&self, product_code: Option<&str>, category: &str) -> CoreResult<ScopeSet> {
        let product = match product_code {
            Some(code) => self.fetch(&ScopeKey::product(code)).await?,
            None => None,
        };

        Ok(ScopeSet {
            global: self.fetch(&ScopeKey::Global).await?,
            category: self.fetch(&ScopeKey::category(category)).await?,
            product,
        })
    }

    async fn fetch(&self, key: &ScopeKey) -> CoreResult<Option<PartialParameterSet>> {
        Ok(self.overrides.get_scope(key).await?.map(|scope| scope.params))
    }
}
