//! `bookstore-auth`: write authorization and admin-mode elevation.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod context;
pub mod permissions;
pub mod principal;

pub use authorize::{AuthzError, authorize, authorize_write};
pub use context::{AdminModeGuard, ExecutionContext};
pub use permissions::Permission;
pub use principal::{Principal, PrincipalId};
