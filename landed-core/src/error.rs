use serde::Serialize;
use std::fmt;

use crate::params::ParameterField;

/// Required parameters still absent after every scope was merged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required parameters: {}", join_fields(.missing))]
pub struct ConfigurationError {
    pub missing: Vec<ParameterField>,
}

fn join_fields(fields: &[ParameterField]) -> String {
    fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why a single input was rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    NotFinite,
    PercentageOutOfRange { value: f64 },
    NotPositive { value: f64 },
    Negative { value: f64 },
    YearOrder { current_year: i32, quotation_year: i32 },
    YearGapTooLarge { years: i64, max: i64 },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::NotFinite => write!(f, "must be a finite number"),
            ViolationKind::PercentageOutOfRange { value } => {
                write!(f, "{} is outside [0, 1]", value)
            }
            ViolationKind::NotPositive { value } => write!(f, "{} must be greater than zero", value),
            ViolationKind::Negative { value } => write!(f, "{} must not be negative", value),
            ViolationKind::YearOrder { current_year, quotation_year } => write!(
                f,
                "current year {} is after quotation year {}",
                current_year, quotation_year
            ),
            ViolationKind::YearGapTooLarge { years, max } => write!(
                f,
                "escalation over {} years exceeds the limit of {}",
                years, max
            ),
        }
    }
}

/// One rejected input. `field` is a parameter name or a rate path such as `rates.usdLocal`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub field: String,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(field: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.kind)
    }
}

/// Every precondition that failed for one calculation request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} invalid input(s): {}", .violations.len(), join_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

/// Failures of collaborators that feed the engine: rate feeds, override storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamDataError {
    #[error("Exchange rates unavailable: {0}")]
    RatesUnavailable(String),
    #[error("Override store unavailable: {0}")]
    OverridesUnavailable(String),
    #[error("Product catalog unavailable: {0}")]
    CatalogUnavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upstream(#[from] UpstreamDataError),
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
