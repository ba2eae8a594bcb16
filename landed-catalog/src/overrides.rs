use std::collections::BTreeMap;

use landed_core::{
    ConfigurationError, ParameterField, ParameterSet, PartialParameterSet, ScopeKey, ScopeSet,
};
use serde::Serialize;

/// Result of merging the three configuration layers for one product.
/// Not necessarily complete: see [`EffectiveParameterSet::require_complete`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveParameterSet {
    pub product_code: String,
    pub category: String,
    pub params: PartialParameterSet,
    /// Scope that supplied each present field.
    pub sources: BTreeMap<ParameterField, ScopeKey>,
}

impl EffectiveParameterSet {
    pub fn source_of(&self, field: ParameterField) -> Option<&ScopeKey> {
        self.sources.get(&field)
    }

    pub fn missing_required(&self) -> Vec<ParameterField> {
        self.params.missing_required()
    }

    pub fn require_complete(&self) -> Result<ParameterSet, ConfigurationError> {
        self.params.clone().into_complete()
    }
}

/// Layered override merge: product beats category beats global.
/// Pure and I/O free; callers fetch the scopes beforehand.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverrideResolver;

impl OverrideResolver {
    pub fn new() -> Self {
        Self
    }

    /// Storage keys to look up for a product, lowest priority first.
    pub fn scope_keys(product_code: &str, category: &str) -> [ScopeKey; 3] {
        [
            ScopeKey::Global,
            ScopeKey::category(category),
            ScopeKey::product(product_code),
        ]
    }

    pub fn resolve(
        &self,
        product_code: &str,
        category: &str,
        scopes: &ScopeSet,
    ) -> EffectiveParameterSet {
        let [global_key, category_key, product_key] = Self::scope_keys(product_code, category);

        let mut params = PartialParameterSet::new();
        let mut sources = BTreeMap::new();

        let layers = [
            (global_key, scopes.global.as_ref()),
            (category_key, scopes.category.as_ref()),
            (product_key, scopes.product.as_ref()),
        ];

        for (key, layer) in layers {
            let Some(layer) = layer else { continue };
            params.overlay(layer);
            for field in layer.present_fields() {
                sources.insert(field, key.clone());
            }
        }

        EffectiveParameterSet {
            product_code: product_code.to_string(),
            category: category.to_string(),
            params,
            sources,
        }
    }
}
