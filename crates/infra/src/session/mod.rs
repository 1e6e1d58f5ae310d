//! Persistence session abstraction and implementations.
//!
//! Rows are kept as their serde JSON representation, keyed by entity name and
//! record id. Typed access goes through [`SessionExt`].

pub mod criteria;
pub mod in_memory;
pub mod r#trait;
pub mod transaction;

pub use criteria::{Criteria, Restriction, TypedCriteria};
pub use in_memory::{InMemoryDatabase, InMemorySession};
pub use r#trait::{PersistenceError, Session, SessionExt};
pub use transaction::Transaction;
