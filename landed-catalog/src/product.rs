use async_trait::async_trait;
use landed_core::UpstreamDataError;
use serde::{Deserialize, Serialize};

/// A piece of imported equipment that can be quoted (a chipper model, a crane, ...).
/// Its pricing inputs live in override scopes, not on the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub code: String,
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

impl Product {
    pub fn new(code: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            category: category.into(),
            description: None,
            is_active: true,
        }
    }

    pub fn is_quotable(&self) -> bool {
        self.is_active && !self.category.trim().is_empty()
    }
}

/// Product catalog access.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get_product(&self, code: &str) -> Result<Option<Product>, UpstreamDataError>;

    async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, UpstreamDataError>;

    async fn upsert_product(&self, product: Product) -> Result<(), UpstreamDataError>;
}
