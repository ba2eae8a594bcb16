use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use landed_api::{app, AppState};
use landed_shared::PricingEvent;
use landed_store::{Config, SeedDocument};
use serde_json::{json, Value};
use tower::ServiceExt;

const CONFIG: &str = r#"
[server]
port = 0

[quoting]
local_currency = "CLP"
display_decimals = 2

[rates]
eur_usd = 1.10
usd_local = 950.0
cache_ttl_seconds = 3600
"#;

const SEED: &str = r#"
{
    "overrides": [
        {
            "scope": "global",
            "params": {
                "manufacturerDiscountPct": 10,
                "annualUpdateFactorPct": 3,
                "eurUsdBufferPct": 2,
                "usdLocalBufferPct": 1.5,
                "insuranceRatePct": 0.6,
                "additionalMarginPct": 25,
                "adValoremDutyPct": 6,
                "vatPct": 19,
                "originLogisticsCostEur": 0,
                "mainFreightUsd": 3500,
                "destinationSurchargesUsd": 500,
                "customsAgentFeeUsd": 450,
                "portAndMiscFeesUsd": 800,
                "nationalTransportLocal": 950000,
                "currentYear": 2025,
                "quotationYear": 2025
            }
        },
        { "scope": "category:chippers", "params": { "adValoremDutyPct": 0 } },
        { "scope": "product:BRUKS-805", "params": { "baseFactoryCostEur": 100000 } }
    ],
    "products": [
        { "code": "BRUKS-805", "name": "Bruks 805 CT", "category": "chippers" },
        { "code": "MUS-MAX", "name": "Mus-Max Wood Terminator", "category": "shredders" }
    ]
}
"#;

async fn test_state() -> AppState {
    let config = Config::from_toml(CONFIG).unwrap();
    let seed = SeedDocument::from_json(SEED).unwrap();
    AppState::build(&config, &seed).await.unwrap()
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let response = app(state.clone()).oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn manual_params() -> Value {
    json!({
        "manufacturerDiscountPct": 10,
        "annualUpdateFactorPct": 3,
        "eurUsdBufferPct": 2,
        "usdLocalBufferPct": 1.5,
        "insuranceRatePct": 0.6,
        "additionalMarginPct": 25,
        "adValoremDutyPct": 6,
        "vatPct": 19,
        "originLogisticsCostEur": 0,
        "mainFreightUsd": 3500,
        "destinationSurchargesUsd": 500,
        "customsAgentFeeUsd": 450,
        "portAndMiscFeesUsd": 800,
        "nationalTransportLocal": 950000,
        "baseFactoryCostEur": 100000,
        "currentYear": 2025,
        "quotationYear": 2025
    })
}

fn approx(value: &Value, expected: f64) -> bool {
    value.as_f64().map_or(false, |v| (v - expected).abs() < 1e-6)
}

#[tokio::test]
async fn test_health() {
    let state = test_state().await;
    let (status, body) = send(&state, request("GET", "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_manual_quote_worked_example() {
    let state = test_state().await;
    let body = json!({ "params": manual_params(), "rates": { "eurUsd": 1.10, "usdLocal": 950.0 } });
    let (status, body) = send(&state, request("POST", "/v1/quotes/manual", Some(body))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "manual");
    assert_eq!(body["productCode"], "ad-hoc");
    assert_eq!(body["summary"]["currency"], "CLP");

    let result = &body["quote"]["result"];
    assert!(approx(&result["netFactoryCostEurExw"], 90_000.0));
    assert!(approx(&result["appliedEurUsd"], 1.122));
    assert!(approx(&result["factoryCostUsdExw"], 100_980.0));
    assert!(approx(&result["cfrUsd"], 104_980.0));
    assert!(approx(&result["insurancePremiumUsd"], 692.868));
    assert!(approx(&result["cifUsd"], 105_672.868));
    assert!(body["quote"]["ratesObservedAt"].is_null());
}

#[tokio::test]
async fn test_manual_quote_missing_fields() {
    let state = test_state().await;
    let body = json!({ "params": { "baseFactoryCostEur": 1000 } });
    let (status, body) = send(&state, request("POST", "/v1/quotes/manual", Some(body))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let missing: Vec<&str> = body["missing"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert!(missing.contains(&"vatPct"));
    assert!(!missing.contains(&"baseFactoryCostEur"));
    assert!(!missing.contains(&"applyTradeAgreement"));
}

#[tokio::test]
async fn test_zero_local_rate_rejected() {
    let state = test_state().await;
    let body = json!({ "params": manual_params(), "rates": { "eurUsd": 1.10, "usdLocal": 0.0 } });
    let (status, body) = send(&state, request("POST", "/v1/quotes/manual", Some(body))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["violations"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["rates.usdLocal"]);
    assert!(body.get("quote").is_none());
}

#[tokio::test]
async fn test_product_quote_uses_stored_scopes() {
    let state = test_state().await;
    let (status, body) = send(
        &state,
        request("POST", "/v1/quotes/products/BRUKS-805", Some(json!({}))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "product");
    assert_eq!(body["category"], "chippers");
    assert_eq!(body["quote"]["result"]["dutyUsd"], 0.0);
    assert_eq!(body["quote"]["effective"]["sources"]["adValoremDutyPct"], "category:chippers");
    assert_eq!(body["quote"]["effective"]["sources"]["baseFactoryCostEur"], "product:BRUKS-805");
    assert!(!body["quote"]["ratesObservedAt"].is_null());
}

#[tokio::test]
async fn test_quote_views() {
    let state = test_state().await;

    let (status, summary) = send(
        &state,
        request("POST", "/v1/quotes/products/BRUKS-805?view=summary", Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(summary.get("quote").is_none());
    assert!(summary.get("breakdown").is_none());
    assert!(summary["summary"]["finalSalePriceLocal"].as_f64().unwrap() > 0.0);

    let (status, breakdown) = send(
        &state,
        request("POST", "/v1/quotes/products/BRUKS-805?view=breakdown", Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(breakdown["breakdown"]["stages"].as_array().unwrap().len(), 5);

    let (status, _) = send(
        &state,
        request("POST", "/v1/quotes/products/BRUKS-805?view=everything", Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_quote_errors() {
    let state = test_state().await;

    let (status, _) = send(
        &state,
        request("POST", "/v1/quotes/products/NOPE", Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // no product scope, so the base cost is missing
    let (status, body) = send(
        &state,
        request("POST", "/v1/quotes/products/MUS-MAX", Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["missing"], json!(["baseFactoryCostEur"]));

    // product quotes do not take parameters
    let (status, _) = send(
        &state,
        request(
            "POST",
            "/v1/quotes/products/BRUKS-805",
            Some(json!({ "params": { "vatPct": 10 } })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_category_quote_request_params_win() {
    let state = test_state().await;
    let body = json!({ "params": { "baseFactoryCostEur": 50000, "adValoremDutyPct": 6 } });
    let (status, body) = send(
        &state,
        request("POST", "/v1/quotes/categories/chippers", Some(body)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "category");
    assert_eq!(body["quote"]["params"]["adValoremDutyPct"], 0.06);
    assert_eq!(body["quote"]["effective"]["sources"]["vatPct"], "global");
    assert!(body["quote"]["result"]["dutyUsd"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_override_lifecycle() {
    let state = test_state().await;
    let mut events = state.events.subscribe();

    let (status, body) = send(
        &state,
        request(
            "PUT",
            "/v1/admin/overrides/product:MUS-MAX",
            Some(json!({ "params": { "baseFactoryCostEur": 80000, "vatPct": 21 }, "updatedBy": "ops" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["params"]["vatPct"], 0.21);
    assert_eq!(body["key"], "product:MUS-MAX");

    match events.try_recv().unwrap() {
        PricingEvent::OverrideChanged(e) => {
            assert_eq!(e.scope, "product:MUS-MAX");
            assert!(!e.deleted);
            assert_eq!(e.fields, vec!["vatPct".to_string(), "baseFactoryCostEur".to_string()]);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let (status, body) = send(
        &state,
        request("GET", "/v1/admin/overrides/effective?product=MUS-MAX", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["complete"], true);
    assert_eq!(body["sources"]["vatPct"], "product:MUS-MAX");
    assert_eq!(body["sources"]["mainFreightUsd"], "global");

    let (status, list) = send(&state, request("GET", "/v1/admin/overrides", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 4);

    let (status, _) = send(&state, request("DELETE", "/v1/admin/overrides/product:MUS-MAX", None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&state, request("DELETE", "/v1/admin/overrides/product:MUS-MAX", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&state, request("GET", "/v1/admin/overrides/product:MUS-MAX", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_override_bad_requests() {
    let state = test_state().await;

    let (status, _) = send(
        &state,
        request("PUT", "/v1/admin/overrides/brand:bruks", Some(json!({ "params": {} }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &state,
        request(
            "PUT",
            "/v1/admin/overrides/global",
            Some(json!({ "params": { "vatPercent": 19 } })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&state, request("GET", "/v1/admin/overrides/effective", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_effective_parameters_for_category_reports_missing() {
    let state = test_state().await;
    let (status, body) = send(
        &state,
        request("GET", "/v1/admin/overrides/effective?category=chippers", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["complete"], false);
    assert_eq!(body["missing"], json!(["baseFactoryCostEur"]));
    assert_eq!(body["params"]["adValoremDutyPct"], 0.0);
}

#[tokio::test]
async fn test_product_admin() {
    let state = test_state().await;

    let (status, body) = send(
        &state,
        request(
            "PUT",
            "/v1/admin/products/PAL-1200",
            Some(json!({ "name": "Palfinger 1200", "category": "cranes" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isActive"], true);

    let (status, list) = send(&state, request("GET", "/v1/admin/products?category=cranes", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["code"], "PAL-1200");

    let (status, _) = send(&state, request("GET", "/v1/admin/products/NOPE", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &state,
        request(
            "PUT",
            "/v1/admin/products/PAL-1200",
            Some(json!({ "name": "Palfinger 1200", "category": " " })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rate_cache_admin() {
    let state = test_state().await;

    let (status, body) = send(&state, request("GET", "/v1/admin/rates", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eurUsd"], 1.10);

    let (status, _) = send(&state, request("DELETE", "/v1/admin/rates", None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&state, request("GET", "/v1/admin/rates", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&state, request("POST", "/v1/admin/rates/refresh", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usdLocal"], 950.0);
}

#[tokio::test]
async fn test_metrics_count_quotes() {
    let state = test_state().await;
    send(
        &state,
        request("POST", "/v1/quotes/products/BRUKS-805", Some(json!({}))),
    )
    .await;
    send(&state, request("POST", "/v1/quotes/products/NOPE", Some(json!({})))).await;

    let response = app(state.clone())
        .oneshot(request("GET", "/metrics", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains(r#"landed_quotes_total{mode="product",outcome="ok"} 1"#));
    assert!(text.contains(r#"landed_quotes_total{mode="product",outcome="error"} 1"#));
}

#[tokio::test]
async fn test_extreme_years_are_validation_errors() {
    let state = test_state().await;
    let mut params = manual_params();
    params["quotationYear"] = json!(i32::MAX);
    params["currentYear"] = json!(i32::MIN);

    let (status, body) = send(
        &state,
        request("POST", "/v1/quotes/manual", Some(json!({ "params": params }))),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"][0]["field"], "quotationYear");
    assert_eq!(body["violations"][0]["kind"], "YEAR_GAP_TOO_LARGE");
}

#[tokio::test]
async fn test_product_coded_ad_hoc_uses_its_own_scope() {
    let state = test_state().await;

    let (status, _) = send(
        &state,
        request(
            "PUT",
            "/v1/admin/products/ad-hoc",
            Some(json!({ "name": "Unusual code", "category": "chippers" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &state,
        request(
            "PUT",
            "/v1/admin/overrides/product:ad-hoc",
            Some(json!({ "params": { "baseFactoryCostEur": 123000 } })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &state,
        request("POST", "/v1/quotes/products/ad-hoc", Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quote"]["params"]["baseFactoryCostEur"], 123000.0);
}

#[tokio::test]
async fn test_padded_category_names_hit_stored_scope() {
    let state = test_state().await;

    let (status, body) = send(
        &state,
        request(
            "POST",
            "/v1/quotes/categories/%20chippers",
            Some(json!({ "params": { "baseFactoryCostEur": 50000 } })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "chippers");
    assert_eq!(body["quote"]["effective"]["sources"]["adValoremDutyPct"], "category:chippers");

    let (status, body) = send(
        &state,
        request(
            "PUT",
            "/v1/admin/products/PAL-1200",
            Some(json!({ "name": "Palfinger 1200", "category": "chippers " })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "chippers");
}
