//! Host-side save of new entities with persistence observers.
//!
//! ```text
//! persist_new(entity)
//!   ↓
//! 1. Join the session's open transaction, or begin one
//!   ↓
//! 2. Fire EntityNewEvent to every observer (registration order)
//!   ↓
//! 3. Apply pending state staged by observers to the instance
//!   ↓
//! 4. Save the instance, commit if the transaction is ours
//! ```
//!
//! Any failure aborts the unit of work: rows written by observers are rolled
//! back together with the triggering instance.

use std::sync::Arc;

use thiserror::Error;

use bookstore_core::Entity;
use bookstore_events::{EntityNewEvent, PendingStateError};

use crate::session::{PersistenceError, Session, SessionExt, Transaction};

/// Reacts to new instances of `E` before they are saved.
pub trait EntityNewObserver<E: Entity>: Send + Sync {
    /// Observer name used in logs and errors.
    fn name(&self) -> &'static str;

    fn on_new(&self, session: &mut dyn Session, event: &mut EntityNewEvent<E>) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{observer} failed for new '{entity}': {source}")]
    Observer {
        observer: &'static str,
        entity: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    PendingState(#[from] PendingStateError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Observers registered for one entity type.
pub struct EntityLifecycle<E: Entity> {
    observers: Vec<Arc<dyn EntityNewObserver<E>>>,
}

impl<E: Entity> Default for EntityLifecycle<E> {
    fn default() -> Self {
        Self {
            observers: Vec::new(),
        }
    }
}

impl<E: Entity> EntityLifecycle<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, observer: Arc<dyn EntityNewObserver<E>>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Persist a new instance, giving observers a chance to react first.
    ///
    /// Inside an already open manual transaction the caller stays in charge of
    /// commit/rollback; otherwise this opens and commits its own.
    pub fn persist_new(&self, session: &mut dyn Session, entity: E) -> Result<E, LifecycleError> {
        if !session.is_autocommit() {
            return self.fire_and_save(session, entity);
        }

        let mut tx = Transaction::begin(session)?;
        let saved = self.fire_and_save(&mut *tx, entity)?;
        tx.commit()?;
        Ok(saved)
    }

    fn fire_and_save(&self, session: &mut dyn Session, entity: E) -> Result<E, LifecycleError> {
        let mut event = EntityNewEvent::new(entity);
        tracing::debug!(
            entity = event.entity_name(),
            occurred_at = %event.occurred_at(),
            observers = self.observers.len(),
            "firing new-entity event"
        );

        for observer in &self.observers {
            observer
                .on_new(session, &mut event)
                .map_err(|source| LifecycleError::Observer {
                    observer: observer.name(),
                    entity: E::ENTITY_NAME,
                    source,
                })?;
        }

        let entity = event.into_current_state()?;
        session.save(&entity)?;
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InMemoryDatabase;
    use bookstore_auth::{ExecutionContext, Principal};
    use bookstore_catalog::{BookVersion, Genre};

    fn version() -> BookVersion {
        BookVersion {
            id: "BV1".parse().unwrap(),
            client: "C1".parse().unwrap(),
            organization: "O1".parse().unwrap(),
            book: None,
            name: "Dune".to_string(),
            search_key: "DUNE".to_string(),
            product: None,
        }
    }

    /// Writes a side row and renames the instance.
    struct Renamer;

    impl EntityNewObserver<BookVersion> for Renamer {
        fn name(&self) -> &'static str {
            "Renamer"
        }

        fn on_new(
            &self,
            session: &mut dyn Session,
            event: &mut EntityNewEvent<BookVersion>,
        ) -> anyhow::Result<()> {
            session.save(&Genre {
                id: "SIDE".parse()?,
                client: event.target().client.clone(),
                organization: event.target().organization.clone(),
                name: "side effect".to_string(),
            })?;
            let renamed = format!("{} (renamed)", event.target().name);
            event.set_current_state("name", &renamed)?;
            Ok(())
        }
    }

    struct Failing;

    impl EntityNewObserver<BookVersion> for Failing {
        fn name(&self) -> &'static str {
            "Failing"
        }

        fn on_new(&self, _: &mut dyn Session, _: &mut EntityNewEvent<BookVersion>) -> anyhow::Result<()> {
            anyhow::bail!("reference data missing")
        }
    }

    fn setup() -> (Arc<InMemoryDatabase>, crate::session::InMemorySession) {
        let db = Arc::new(InMemoryDatabase::new());
        let session = db.session(ExecutionContext::new(Principal::system("C1".parse().unwrap())));
        (db, session)
    }

    #[test]
    fn observers_changes_are_saved_with_the_instance() {
        let (db, mut session) = setup();
        let lifecycle = EntityLifecycle::<BookVersion>::new().register(Arc::new(Renamer));

        let saved = lifecycle.persist_new(&mut session, version()).unwrap();

        assert_eq!(saved.name, "Dune (renamed)");
        assert_eq!(db.rows(BookVersion::ENTITY_NAME).unwrap().len(), 1);
        assert_eq!(db.rows(Genre::ENTITY_NAME).unwrap().len(), 1);
        assert!(session.is_autocommit());
    }

    #[test]
    fn observer_failure_rolls_back_everything() {
        let (db, mut session) = setup();
        let lifecycle = EntityLifecycle::<BookVersion>::new()
            .register(Arc::new(Renamer))
            .register(Arc::new(Failing));

        let err = lifecycle.persist_new(&mut session, version()).unwrap_err();

        assert!(matches!(err, LifecycleError::Observer { observer: "Failing", .. }));
        assert!(db.rows(BookVersion::ENTITY_NAME).unwrap().is_empty());
        assert!(db.rows(Genre::ENTITY_NAME).unwrap().is_empty());
        assert!(session.is_autocommit());
    }

    #[test]
    fn open_transaction_is_joined_not_committed() {
        let (db, mut session) = setup();
        let lifecycle = EntityLifecycle::<BookVersion>::new().register(Arc::new(Renamer));

        session.set_autocommit(false).unwrap();
        lifecycle.persist_new(&mut session, version()).unwrap();
        assert!(db.rows(BookVersion::ENTITY_NAME).unwrap().is_empty());

        session.commit().unwrap();
        assert_eq!(db.rows(BookVersion::ENTITY_NAME).unwrap().len(), 1);
    }
}
