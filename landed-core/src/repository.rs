use async_trait::async_trait;

use crate::error::UpstreamDataError;
use crate::scope::{OverrideScope, ScopeKey};

/// Storage of override scopes. Each scope is stored on its own; the resolver
/// computes inheritance when a quote is requested.
#[async_trait]
pub trait OverrideRepository: Send + Sync {
    async fn get_scope(&self, key: &ScopeKey) -> Result<Option<OverrideScope>, UpstreamDataError>;

    /// Insert or replace the scope stored under `scope.key`.
    async fn put_scope(&self, scope: OverrideScope) -> Result<(), UpstreamDataError>;

    /// Returns false when nothing was stored under `key`.
    async fn delete_scope(&self, key: &ScopeKey) -> Result<bool, UpstreamDataError>;

    async fn list_scopes(&self) -> Result<Vec<OverrideScope>, UpstreamDataError>;
}
