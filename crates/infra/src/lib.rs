//! Infrastructure layer: persistence sessions, transactions, entity lifecycle.

pub mod lifecycle;
pub mod session;
