use thiserror::Error;

use crate::{ExecutionContext, Permission, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Check a single permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if principal.has_permission(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Check that the context may write rows of `entity_name`.
///
/// Admin mode grants every write.
pub fn authorize_write(ctx: &ExecutionContext, entity_name: &str) -> Result<(), AuthzError> {
    if ctx.is_admin_mode() {
        return Ok(());
    }
    authorize(ctx.principal(), &Permission::write(entity_name))
}
