use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;

use bookstore_auth::{AuthzError, ExecutionContext};
use bookstore_core::{Entity, RecordId};

use super::criteria::TypedCriteria;

/// Persistence operation error.
///
/// These are **infrastructure errors** (encoding, authorization, transaction
/// state, storage availability) as opposed to domain errors.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to encode '{entity}' row: {message}")]
    Serialization { entity: &'static str, message: String },

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error("invalid transaction state: {0}")]
    Transaction(String),

    #[error("storage unavailable: {0}")]
    Connection(String),
}

/// A unit-of-work over the relational store.
///
/// Writes are staged in the session until committed. With autocommit on, a
/// `flush` commits immediately; with autocommit off, changes become durable
/// only on `commit` and are discarded by `rollback`.
///
/// Sessions are not meant to be shared across threads; each request opens its
/// own.
pub trait Session {
    /// Execution context (principal + privilege mode) writes are checked against.
    fn context(&self) -> &Arc<ExecutionContext>;

    fn load(&self, entity: &'static str, id: &RecordId) -> Result<Option<JsonValue>, PersistenceError>;

    fn query(
        &self,
        entity: &'static str,
        criteria: &super::Criteria,
    ) -> Result<Vec<JsonValue>, PersistenceError>;

    /// Insert or replace a row.
    fn store(&mut self, entity: &'static str, id: RecordId, row: JsonValue) -> Result<(), PersistenceError>;

    /// Delete a row. Returns whether it existed.
    fn delete(&mut self, entity: &'static str, id: &RecordId) -> Result<bool, PersistenceError>;

    fn flush(&mut self) -> Result<(), PersistenceError>;

    fn is_autocommit(&self) -> bool;

    fn set_autocommit(&mut self, autocommit: bool) -> Result<(), PersistenceError>;

    fn commit(&mut self) -> Result<(), PersistenceError>;

    fn rollback(&mut self) -> Result<(), PersistenceError>;
}

/// Typed access on top of any [`Session`].
pub trait SessionExt: Session {
    fn get<E: Entity>(&self, id: &E::Id) -> Result<Option<E>, PersistenceError> {
        self.load(E::ENTITY_NAME, id.as_ref())?
            .map(decode::<E>)
            .transpose()
    }

    fn save<E: Entity>(&mut self, entity: &E) -> Result<(), PersistenceError> {
        let row = serde_json::to_value(entity).map_err(|e| PersistenceError::Serialization {
            entity: E::ENTITY_NAME,
            message: e.to_string(),
        })?;
        self.store(E::ENTITY_NAME, entity.id().as_ref().clone(), row)
    }

    fn remove<E: Entity>(&mut self, entity: &E) -> Result<bool, PersistenceError> {
        self.delete(E::ENTITY_NAME, entity.id().as_ref())
    }

    fn criteria<E: Entity>(&self) -> TypedCriteria<'_, Self, E> {
        TypedCriteria::new(self)
    }
}

impl<S: Session + ?Sized> SessionExt for S {}

pub(crate) fn decode<E: Entity + DeserializeOwned>(row: JsonValue) -> Result<E, PersistenceError> {
    serde_json::from_value(row).map_err(|e| PersistenceError::Serialization {
        entity: E::ENTITY_NAME,
        message: e.to_string(),
    })
}
