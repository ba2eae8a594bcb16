use std::collections::HashMap;

use async_trait::async_trait;
use landed_catalog::{Product, ProductRepository};
use landed_core::{OverrideRepository, OverrideScope, ScopeKey, UpstreamDataError};
use tokio::sync::RwLock;
use tracing::info;

/// Process-local override store. Scopes are kept independently, keyed by scope key.
#[derive(Default)]
pub struct InMemoryOverrideRepository {
    scopes: RwLock<HashMap<ScopeKey, OverrideScope>>,
}

impl InMemoryOverrideRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OverrideRepository for InMemoryOverrideRepository {
    async fn get_scope(&self, key: &ScopeKey) -> Result<Option<OverrideScope>, UpstreamDataError> {
        Ok(self.scopes.read().await.get(key).cloned())
    }

    async fn put_scope(&self, scope: OverrideScope) -> Result<(), UpstreamDataError> {
        info!("Override scope stored: {} ({} fields)", scope.key, scope.params.present_fields().len());
        self.scopes.write().await.insert(scope.key.clone(), scope);
        Ok(())
    }

    async fn delete_scope(&self, key: &ScopeKey) -> Result<bool, UpstreamDataError> {
        let removed = self.scopes.write().await.remove(key).is_some();
        if removed {
            info!("Override scope removed: {}", key);
        }
        Ok(removed)
    }

    async fn list_scopes(&self) -> Result<Vec<OverrideScope>, UpstreamDataError> {
        let mut scopes: Vec<OverrideScope> = self.scopes.read().await.values().cloned().collect();
        scopes.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(scopes)
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<String, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get_product(&self, code: &str) -> Result<Option<Product>, UpstreamDataError> {
        Ok(self.products.read().await.get(code).cloned())
    }

    async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, UpstreamDataError> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(products)
    }

    async fn upsert_product(&self, product: Product) -> Result<(), UpstreamDataError> {
        self.products.write().await.insert(product.code.clone(), product);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landed_core::PartialParameterSet;

    #[tokio::test]
    async fn test_override_lifecycle() {
        let repo = InMemoryOverrideRepository::new();
        let key = ScopeKey::category("chippers");

        assert!(repo.get_scope(&key).await.unwrap().is_none());

        repo.put_scope(OverrideScope::new(
            key.clone(),
            PartialParameterSet {
                vat_pct: Some(0.19),
                ..Default::default()
            },
            None,
        ))
        .await
        .unwrap();
        assert_eq!(
            repo.get_scope(&key).await.unwrap().unwrap().params.vat_pct,
            Some(0.19)
        );

        // replace, not merge
        repo.put_scope(OverrideScope::new(
            key.clone(),
            PartialParameterSet {
                main_freight_usd: Some(3500.0),
                ..Default::default()
            },
            None,
        ))
        .await
        .unwrap();
        let stored = repo.get_scope(&key).await.unwrap().unwrap();
        assert_eq!(stored.params.vat_pct, None);
        assert_eq!(stored.params.main_freight_usd, Some(3500.0));

        assert!(repo.delete_scope(&key).await.unwrap());
        assert!(!repo.delete_scope(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_scopes_is_ordered_by_priority() {
        let repo = InMemoryOverrideRepository::new();
        for key in [
            ScopeKey::product("BRUKS-805"),
            ScopeKey::Global,
            ScopeKey::category("chippers"),
        ] {
            repo.put_scope(OverrideScope::new(key, PartialParameterSet::new(), None))
                .await
                .unwrap();
        }

        let keys: Vec<String> = repo
            .list_scopes()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.key.to_string())
            .collect();
        assert_eq!(keys, vec!["global", "category:chippers", "product:BRUKS-805"]);
    }

    #[tokio::test]
    async fn test_list_products_by_category() {
        let repo = InMemoryProductRepository::new();
        repo.upsert_product(Product::new("BRUKS-805", "Bruks 805 CT", "chippers")).await.unwrap();
        repo.upsert_product(Product::new("MUS-MAX", "Mus-Max Wood Terminator", "shredders")).await.unwrap();

        let chippers = repo.list_products(Some("chippers")).await.unwrap();
        assert_eq!(chippers.len(), 1);
        assert_eq!(chippers[0].code, "BRUKS-805");
        assert_eq!(repo.list_products(None).await.unwrap().len(), 2);
    }
}
