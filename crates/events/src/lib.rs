//! Entity lifecycle events delivered to persistence observers.

pub mod new_event;
pub mod pending;

pub use new_event::EntityNewEvent;
pub use pending::{PendingState, PendingStateError};
