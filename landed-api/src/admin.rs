use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use landed_catalog::{EffectiveParameterSet, Product, QuoteBasis};
use landed_core::{
    ObservedRates, OverrideScope, ParameterField, PartialParameterSet, ScopeKey,
    UserParameterInput,
};
use landed_shared::{event_timestamp, OverrideChangedEvent, PricingEvent, RatesRefreshedEvent};
use serde::{Deserialize, Serialize};

use crate::error::{ApiJson, AppError};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Replacement contents of one scope. Percentages in whole percents.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OverrideBody {
    pub params: UserParameterInput,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EffectiveQuery {
    pub product: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveResponse {
    #[serde(flatten)]
    pub effective: EffectiveParameterSet,
    pub missing: Vec<ParameterField>,
    pub complete: bool,
}

#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductBody {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/overrides", get(list_overrides))
        .route("/v1/admin/overrides/effective", get(effective_parameters))
        .route(
            "/v1/admin/overrides/{scope}",
            get(get_override).put(put_override).delete(delete_override),
        )
        .route("/v1/admin/products", get(list_products))
        .route("/v1/admin/products/{code}", get(get_product).put(put_product))
        .route("/v1/admin/rates", get(get_rates).delete(invalidate_rates))
        .route("/v1/admin/rates/refresh", post(refresh_rates))
}

// ============================================================================
// Override Scopes
// ============================================================================

/// GET /v1/admin/overrides
pub async fn list_overrides(
    State(state): State<AppState>,
) -> Result<Json<Vec<OverrideScope>>, AppError> {
    Ok(Json(state.overrides.list_scopes().await?))
}

/// GET /v1/admin/overrides/{scope}
pub async fn get_override(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> Result<Json<OverrideScope>, AppError> {
    let key: ScopeKey = scope.parse()?;
    state
        .overrides
        .get_scope(&key)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No override scope {}", key)))
}

/// PUT /v1/admin/overrides/{scope}
///
/// Replaces the whole scope. Fields left out are absent afterwards and fall
/// through to lower-priority scopes.
pub async fn put_override(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    ApiJson(body): ApiJson<OverrideBody>,
) -> Result<Json<OverrideScope>, AppError> {
    let key: ScopeKey = scope.parse()?;
    let params: PartialParameterSet = body.params.ingest();
    let fields = field_names(&params);

    let stored = OverrideScope::new(key.clone(), params, body.updated_by);
    state.overrides.put_scope(stored.clone()).await?;
    state.metrics.override_writes.inc();

    state.events.publish(PricingEvent::OverrideChanged(OverrideChangedEvent {
        scope: key.to_string(),
        fields,
        deleted: false,
        timestamp: event_timestamp(),
    }));

    Ok(Json(stored))
}

/// DELETE /v1/admin/overrides/{scope}
pub async fn delete_override(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> Result<StatusCode, AppError> {
    let key: ScopeKey = scope.parse()?;
    if !state.overrides.delete_scope(&key).await? {
        return Err(AppError::NotFound(format!("No override scope {}", key)));
    }
    state.metrics.override_writes.inc();

    state.events.publish(PricingEvent::OverrideChanged(OverrideChangedEvent {
        scope: key.to_string(),
        fields: Vec::new(),
        deleted: true,
        timestamp: event_timestamp(),
    }));

    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/admin/overrides/effective?product=..&category=..
///
/// The merged parameters a quote would use, with the scope behind each value.
/// Incomplete sets are returned as is, listing what is still missing.
pub async fn effective_parameters(
    State(state): State<AppState>,
    Query(query): Query<EffectiveQuery>,
) -> Result<Json<EffectiveResponse>, AppError> {
    let basis = match (query.product, query.category) {
        (Some(code), _) => QuoteBasis::Product { code },
        (None, Some(name)) => QuoteBasis::Category {
            name,
            params: PartialParameterSet::new(),
        },
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either product or category is required".to_string(),
            ))
        }
    };

    let effective = state.quotes.effective_parameters(basis).await?;
    let missing = effective.missing_required();
    Ok(Json(EffectiveResponse {
        complete: missing.is_empty(),
        effective,
        missing,
    }))
}

fn field_names(params: &PartialParameterSet) -> Vec<String> {
    params
        .present_fields()
        .into_iter()
        .map(|f| f.name().to_string())
        .collect()
}

// ============================================================================
// Products
// ============================================================================

/// GET /v1/admin/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.products.list_products(filter.category.as_deref()).await?;
    Ok(Json(products))
}

/// GET /v1/admin/products/{code}
pub async fn get_product(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Product>, AppError> {
    state
        .products
        .get_product(&code)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No product {}", code)))
}

/// PUT /v1/admin/products/{code}
pub async fn put_product(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ApiJson(body): ApiJson<ProductBody>,
) -> Result<Json<Product>, AppError> {
    let category = body.category.trim().to_string();
    if category.is_empty() {
        return Err(AppError::BadRequest("Product category must not be blank".to_string()));
    }

    let product = Product {
        code,
        name: body.name,
        category,
        description: body.description,
        is_active: body.is_active,
    };
    state.products.upsert_product(product.clone()).await?;
    tracing::info!("Product {} saved in category {}", product.code, product.category);

    Ok(Json(product))
}

// ============================================================================
// Exchange Rates
// ============================================================================

/// GET /v1/admin/rates
pub async fn get_rates(State(state): State<AppState>) -> Result<Json<ObservedRates>, AppError> {
    state
        .rates
        .cached()
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No cached exchange rates".to_string()))
}

/// POST /v1/admin/rates/refresh
pub async fn refresh_rates(State(state): State<AppState>) -> Result<Json<ObservedRates>, AppError> {
    let observed = state.rates.refresh().await?;

    state.events.publish(PricingEvent::RatesRefreshed(RatesRefreshedEvent {
        eur_usd: observed.snapshot.eur_usd,
        usd_local: observed.snapshot.usd_local,
        timestamp: event_timestamp(),
    }));

    Ok(Json(observed))
}

/// DELETE /v1/admin/rates
pub async fn invalidate_rates(State(state): State<AppState>) -> StatusCode {
    state.rates.invalidate().await;
    StatusCode::NO_CONTENT
}
