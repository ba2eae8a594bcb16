use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use landed_core::{ConfigurationError, CoreError, ScopeKeyError, UpstreamDataError, ValidationError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Configuration(ConfigurationError),
    #[error(transparent)]
    Validation(ValidationError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Upstream(UpstreamDataError),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Configuration(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": err.to_string(), "missing": err.missing }),
            ),
            AppError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": err.to_string(), "violations": err.violations }),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Upstream(err) => {
                tracing::warn!("Upstream failure: {}", err);
                (StatusCode::BAD_GATEWAY, json!({ "error": err.to_string() }))
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Configuration(e) => AppError::Configuration(e),
            CoreError::Validation(e) => AppError::Validation(e),
            CoreError::Upstream(e) => AppError::Upstream(e),
            CoreError::NotFound(what) => AppError::NotFound(format!("Not found: {}", what)),
        }
    }
}

impl From<UpstreamDataError> for AppError {
    fn from(err: UpstreamDataError) -> Self {
        AppError::Upstream(err)
    }
}

impl From<ScopeKeyError> for AppError {
    fn from(err: ScopeKeyError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<prometheus::Error> for AppError {
    fn from(err: prometheus::Error) -> Self {
        AppError::Anyhow(err.into())
    }
}

/// JSON body extractor whose rejections use the API error shape (400).
#[derive(axum::extract::FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use landed_core::{ParameterField, Violation, ViolationKind};

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (
                CoreError::Configuration(ConfigurationError {
                    missing: vec![ParameterField::VatPct],
                })
                .into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CoreError::Validation(ValidationError {
                    violations: vec![Violation::new(
                        "rates.usdLocal",
                        ViolationKind::NotPositive { value: 0.0 },
                    )],
                })
                .into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (CoreError::NotFound("product X".into()).into(), StatusCode::NOT_FOUND),
            (
                UpstreamDataError::RatesUnavailable("down".into()).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                "nope".parse::<landed_core::ScopeKey>().unwrap_err().into(),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::Anyhow(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
