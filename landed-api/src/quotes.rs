use axum::{
    extract::{Path, Query, State},
    routing::post,
    Json, Router,
};
use landed_catalog::{
    Quote, QuoteBasis, QuoteBreakdown, QuoteMode, QuoteRequest, QuoteSummary, AD_HOC_LABEL,
};
use landed_core::{ExchangeRateSnapshot, UserParameterInput};
use landed_shared::{event_timestamp, PricingEvent, QuoteCalculatedEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiJson, AppError};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of manual and category quotes. Percentages in whole percents.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuoteBody {
    #[serde(default)]
    pub params: UserParameterInput,
    #[serde(default)]
    pub rates: Option<ExchangeRateSnapshot>,
}

/// Product quotes take every parameter from the stored scopes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductQuoteBody {
    #[serde(default)]
    pub rates: Option<ExchangeRateSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteView {
    #[default]
    Full,
    Summary,
    Breakdown,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub view: QuoteView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub quote_id: Uuid,
    pub mode: QuoteMode,
    pub product_code: String,
    pub category: String,
    pub summary: QuoteSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<QuoteBreakdown>,
    /// Effective parameters with sources, rates and the unrounded pipeline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/quotes/manual", post(quote_manual))
        .route("/v1/quotes/products/{code}", post(quote_product))
        .route("/v1/quotes/categories/{name}", post(quote_category))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/quotes/manual
pub async fn quote_manual(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
    ApiJson(body): ApiJson<QuoteBody>,
) -> Result<Json<QuoteResponse>, AppError> {
    let basis = QuoteBasis::Manual {
        params: body.params.ingest(),
    };
    run_quote(&state, basis, body.rates, query.view).await
}

/// POST /v1/quotes/products/{code}
pub async fn quote_product(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<ViewQuery>,
    ApiJson(body): ApiJson<ProductQuoteBody>,
) -> Result<Json<QuoteResponse>, AppError> {
    run_quote(&state, QuoteBasis::Product { code }, body.rates, query.view).await
}

/// POST /v1/quotes/categories/{name}
pub async fn quote_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ViewQuery>,
    ApiJson(body): ApiJson<QuoteBody>,
) -> Result<Json<QuoteResponse>, AppError> {
    let basis = QuoteBasis::Category {
        name,
        params: body.params.ingest(),
    };
    run_quote(&state, basis, body.rates, query.view).await
}

async fn run_quote(
    state: &AppState,
    basis: QuoteBasis,
    rates: Option<ExchangeRateSnapshot>,
    view: QuoteView,
) -> Result<Json<QuoteResponse>, AppError> {
    let mode = basis.mode();
    let outcome = state.quotes.quote(QuoteRequest { basis, rates }).await;
    state.metrics.record_quote(mode.as_str(), outcome.is_ok());
    let quote = outcome?;

    let quote_id = Uuid::new_v4();
    let named = |value: &str| (value != AD_HOC_LABEL).then(|| value.to_string());
    state.events.publish(PricingEvent::QuoteCalculated(QuoteCalculatedEvent {
        quote_id,
        mode: mode.as_str().to_string(),
        product_code: named(&quote.effective.product_code),
        category: named(&quote.effective.category),
        landed_cost_local: quote.result.landed_cost_local,
        final_sale_price_local: quote.result.final_sale_price_local,
        timestamp: event_timestamp(),
    }));

    let summary = state.formatter.summary(&quote.result);
    let breakdown = (view == QuoteView::Breakdown).then(|| state.formatter.breakdown(&quote.result));

    Ok(Json(QuoteResponse {
        quote_id,
        mode,
        product_code: quote.effective.product_code.clone(),
        category: quote.effective.category.clone(),
        summary,
        breakdown,
        quote: (view == QuoteView::Full).then_some(quote),
    }))
}
