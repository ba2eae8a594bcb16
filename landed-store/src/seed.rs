use std::path::Path;

use landed_catalog::{Product, ProductRepository};
use landed_core::{
    OverrideRepository, OverrideScope, PartialParameterSet, ScopeKey, UpstreamDataError,
    UserParameterInput,
};
use serde::Deserialize;
use tracing::info;

/// Initial data loaded at start-up. Parameter values use whole percents, as an
/// administrator would type them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedDocument {
    /// Boundary defaults placed beneath the global scope.
    #[serde(default)]
    pub defaults: UserParameterInput,
    #[serde(default)]
    pub overrides: Vec<SeedScope>,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedScope {
    pub scope: ScopeKey,
    pub params: UserParameterInput,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] UpstreamDataError),
}

impl SeedDocument {
    pub fn from_json(contents: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Defaults converted to decimals, ready for the quote service.
    pub fn ingested_defaults(&self) -> PartialParameterSet {
        self.defaults.clone().ingest()
    }

    /// Write every scope and product into the given stores.
    pub async fn apply(
        &self,
        overrides: &dyn OverrideRepository,
        products: &dyn ProductRepository,
    ) -> Result<(), SeedError> {
        for seed in &self.overrides {
            let scope = OverrideScope::new(
                seed.scope.clone(),
                seed.params.clone().ingest(),
                seed.updated_by.clone(),
            );
            overrides.put_scope(scope).await?;
        }

        for product in &self.products {
            products.upsert_product(product.clone()).await?;
        }

        info!(
            scopes = self.overrides.len(),
            products = self.products.len(),
            "Seed data loaded"
        );
        Ok(())
    }
}
