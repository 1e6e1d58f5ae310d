use core::ops::{Deref, DerefMut};

use super::r#trait::{PersistenceError, Session};

/// Manual transaction boundary over a session.
///
/// `begin` turns autocommit off. Dropping the guard without a successful
/// [`Transaction::commit`] rolls back. Autocommit is restored in every case;
/// failures while cleaning up are logged and ignored since they happen while
/// unwinding another outcome.
pub struct Transaction<'s, S: Session + ?Sized> {
    session: &'s mut S,
    finished: bool,
}

impl<'s, S: Session + ?Sized> Transaction<'s, S> {
    pub fn begin(session: &'s mut S) -> Result<Self, PersistenceError> {
        session.set_autocommit(false)?;
        Ok(Self {
            session,
            finished: false,
        })
    }

    /// Flush pending writes and commit them.
    pub fn commit(mut self) -> Result<(), PersistenceError> {
        self.session.flush()?;
        self.session.commit()?;
        self.finished = true;
        Ok(())
    }

    /// Discard everything written through this transaction.
    pub fn rollback(mut self) -> Result<(), PersistenceError> {
        self.finished = true;
        self.session.rollback()
    }
}

impl<S: Session + ?Sized> Deref for Transaction<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.session
    }
}

impl<S: Session + ?Sized> DerefMut for Transaction<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.session
    }
}

impl<S: Session + ?Sized> Drop for Transaction<'_, S> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.session.rollback() {
                tracing::warn!("rollback failed while closing transaction: {e}");
            }
        }
        if let Err(e) = self.session.set_autocommit(true) {
            tracing::warn!("failed to restore autocommit: {e}");
        }
    }
}
