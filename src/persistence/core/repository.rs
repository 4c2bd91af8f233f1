use async_trait::async_trait;

use super::error::RepositoryError;

// ============================================================================
// Filtered Repository - Generic persistence contract
// ============================================================================
//
// Generic over four roles, expressed as associated types:
// - `Entity`: the stored aggregate
// - `Create`: input consumed to construct a new entity
// - `Update`: partial update input
// - `Filter`: structured predicate (see `Filter<K>`), never raw query text
//
// Domain repositories build their specialised finders by composing filters,
// so this contract never needs to know about domain fields.
//
// ============================================================================

#[async_trait]
pub trait Repository: Send + Sync {
    type Entity: Send;
    type Create: Send;
    type Update: Send;
    type Filter: Send;

    /// Single-entity lookup. An id of the wrong shape is `NotFound`.
    async fn find_one(&self, id: &str) -> Result<Self::Entity, RepositoryError>;

    /// All entities matching the predicate; empty when nothing matches.
    async fn find_many(&self, filter: Self::Filter) -> Result<Vec<Self::Entity>, RepositoryError>;

    /// Construct and persist a new entity.
    async fn insert_one(&self, data: Self::Create) -> Result<Self::Entity, RepositoryError>;

    /// Apply a partial update and return the post-update entity.
    async fn update_one(
        &self,
        id: &str,
        data: Self::Update,
    ) -> Result<Self::Entity, RepositoryError>;

    /// Remove and return the entity.
    async fn delete_one(&self, id: &str) -> Result<Self::Entity, RepositoryError>;

    /// Bulk removal. Returns how many entities were removed; zero is not an error.
    async fn delete_many(&self, filter: Self::Filter) -> Result<u64, RepositoryError>;
}
