use chrono::{DateTime, Utc};
use landed_shared::Masked;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::params::PartialParameterSet;

/// Storage key of a configuration layer: `global`, `category:<name>` or `product:<code>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScopeKey {
    Global,
    Category(String),
    Product(String),
}

impl ScopeKey {
    /// Surrounding whitespace is dropped, as when parsing `category:<name>`.
    pub fn category(name: impl AsRef<str>) -> Self {
        ScopeKey::Category(name.as_ref().trim().to_string())
    }

    pub fn product(code: impl AsRef<str>) -> Self {
        ScopeKey::Product(code.as_ref().trim().to_string())
    }

    pub fn level(&self) -> ScopeLevel {
        match self {
            ScopeKey::Global => ScopeLevel::Global,
            ScopeKey::Category(_) => ScopeLevel::Category,
            ScopeKey::Product(_) => ScopeLevel::Product,
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKey::Global => write!(f, "global"),
            ScopeKey::Category(name) => write!(f, "category:{}", name),
            ScopeKey::Product(code) => write!(f, "product:{}", code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid scope key '{0}': expected global, category:<name> or product:<code>")]
pub struct ScopeKeyError(pub String);

impl FromStr for ScopeKey {
    type Err = ScopeKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "global" {
            return Ok(ScopeKey::Global);
        }

        let (prefix, name) = s.split_once(':').ok_or_else(|| ScopeKeyError(s.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ScopeKeyError(s.to_string()));
        }

        match prefix {
            "category" => Ok(ScopeKey::category(name)),
            "product" => Ok(ScopeKey::product(name)),
            _ => Err(ScopeKeyError(s.to_string())),
        }
    }
}

impl TryFrom<String> for ScopeKey {
    type Error = ScopeKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScopeKey> for String {
    fn from(key: ScopeKey) -> Self {
        key.to_string()
    }
}

/// Merge priority, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeLevel {
    Global,
    Category,
    Product,
}

/// A stored configuration layer with its audit metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideScope {
    pub key: ScopeKey,
    pub params: PartialParameterSet,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub updated_by: Option<Masked<String>>,
}

impl OverrideScope {
    pub fn new(key: ScopeKey, params: PartialParameterSet, updated_by: Option<String>) -> Self {
        Self {
            key,
            params,
            last_updated: Utc::now(),
            updated_by: updated_by.map(Masked::new),
        }
    }
}

/// The three layers handed to the resolver, already fetched by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeSet {
    pub global: Option<PartialParameterSet>,
    pub category: Option<PartialParameterSet>,
    pub product: Option<PartialParameterSet>,
}

impl ScopeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global(mut self, params: PartialParameterSet) -> Self {
        self.global = Some(params);
        self
    }

    pub fn with_category(mut self, params: PartialParameterSet) -> Self {
        self.category = Some(params);
        self
    }

    pub fn with_product(mut self, params: PartialParameterSet) -> Self {
        self.product = Some(params);
        self
    }

    /// Slide boundary defaults beneath the global layer. Global values still win.
    pub fn with_defaults(mut self, defaults: &PartialParameterSet) -> Self {
        if defaults.is_empty() {
            return self;
        }
        let base = defaults.clone();
        self.global = Some(match self.global.take() {
            Some(global) => base.overlaid(&global),
            None => base,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_key_round_trip() {
        for raw in ["global", "category:chippers", "product:BRUKS-805"] {
            let key: ScopeKey = raw.parse().unwrap();
            assert_eq!(key.to_string(), raw);
        }
    }

    #[test]
    fn test_scope_key_rejects_malformed() {
        assert!("category:".parse::<ScopeKey>().is_err());
        assert!("brand:bruks".parse::<ScopeKey>().is_err());
        assert!("chippers".parse::<ScopeKey>().is_err());
    }

    #[test]
    fn test_scope_key_keeps_colons_in_name() {
        let key: ScopeKey = "product:BR:805".parse().unwrap();
        assert_eq!(key, ScopeKey::product("BR:805"));
    }

    #[test]
    fn test_constructors_match_parsed_keys() {
        assert_eq!(ScopeKey::category(" chippers "), "category:chippers".parse().unwrap());
        assert_eq!(ScopeKey::product("BRUKS-805\t"), "product: BRUKS-805".parse().unwrap());
    }

    #[test]
    fn test_scope_levels_order() {
        assert!(ScopeLevel::Product > ScopeLevel::Category);
        assert!(ScopeLevel::Category > ScopeLevel::Global);
        assert_eq!(ScopeKey::category("chippers").level(), ScopeLevel::Category);
    }

    #[test]
    fn test_defaults_sit_beneath_global() {
        let defaults = PartialParameterSet {
            vat_pct: Some(0.19),
            insurance_rate_pct: Some(0.006),
            ..Default::default()
        };
        let global = PartialParameterSet {
            vat_pct: Some(0.21),
            ..Default::default()
        };

        let scopes = ScopeSet::new().with_global(global).with_defaults(&defaults);
        let merged = scopes.global.unwrap();
        assert_eq!(merged.vat_pct, Some(0.21));
        assert_eq!(merged.insurance_rate_pct, Some(0.006));
    }

    #[test]
    fn test_override_scope_json_shape() {
        let scope = OverrideScope::new(
            ScopeKey::category("chippers"),
            PartialParameterSet {
                ad_valorem_duty_pct: Some(0.06),
                ..Default::default()
            },
            Some("pricing@example.com".to_string()),
        );

        let json = serde_json::to_value(&scope).unwrap();
        assert_eq!(json["key"], "category:chippers");
        assert_eq!(json["params"]["adValoremDutyPct"], 0.06);
        assert_eq!(json["updatedBy"], "pricing@example.com");
        assert!(!format!("{:?}", scope).contains("pricing@example.com"));
    }
}
