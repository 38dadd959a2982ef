//! Common repository traits
//!
//! Generic interfaces for operations against the document store. The
//! methods return `Send` futures, matching the store trait, so callers
//! generic over the store can await them inside spawned tasks.

use crate::store::StoreError;
use std::future::Future;

/// Trait for creating new entities in the store
///
/// # Type Parameters
/// * `Entity` - Type of the returned entity (with the key assigned by the store)
/// * `CreateDTO` - DTO for creation (without key, assigned on commit)
pub trait Create<Entity, CreateDTO> {
    /// Creates a new entity in the store
    ///
    /// # Returns
    /// * `Ok(Entity)` - Created entity with its store-assigned key
    /// * `Err(StoreError)` - Error during the write
    fn create(&self, data: &CreateDTO) -> impl Future<Output = Result<Entity, StoreError>> + Send;
}

/// Trait for reading a single entity by key
///
/// # Type Parameters
/// * `Entity` - Type of the entity to read
/// * `Id` - Type of the key (e.g. `String`, `(String, String)` for
///   entities scoped under a parent document)
pub trait Read<Entity, Id> {
    /// Reads an entity from the store by its key
    ///
    /// # Returns
    /// * `Ok(Some(Entity))` - Entity found
    /// * `Ok(None)` - No entity with that key
    /// * `Err(StoreError)` - Error during the read
    fn read(&self, id: &Id) -> impl Future<Output = Result<Option<Entity>, StoreError>> + Send;
}

/// Trait for deleting entities
///
/// # Type Parameters
/// * `Id` - Type of the key
pub trait Delete<Id> {
    /// Deletes an entity from the store
    ///
    /// # Returns
    /// * `Ok(())` - Deletion successful (absent entities delete cleanly)
    /// * `Err(StoreError)` - Error during the deletion
    fn delete(&self, id: &Id) -> impl Future<Output = Result<(), StoreError>> + Send;
}
