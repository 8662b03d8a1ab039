//! Metadata store boundary trait.
//!
//! The document database that owns file metadata is an external
//! collaborator. The transfer engine depends on exactly two of its
//! operations, so the boundary is a two-method trait rather than a full
//! repository contract.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;

/// Lookup/create boundary to the document store.
///
/// The trait is generic over the entity so that this crate stays free of
/// domain types; the service layer binds it to its file-metadata entity.
#[async_trait]
pub trait MetadataStore<Entity>: Send + Sync + 'static
where
    Entity: Send + Sync + 'static,
{
    /// Find a metadata record by its identifier.
    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<Entity>>;

    /// Create a new metadata record and return it with its assigned id.
    async fn create(&self, entity: Entity) -> AppResult<Entity>;
}
