//! Per-session execution context and admin-mode elevation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::Principal;

#[derive(Debug, Default)]
struct ModeState {
    admin: bool,
    previous: Vec<bool>,
}

/// Who a session runs as, plus the current privilege mode.
///
/// Admin mode bypasses entity write checks. Modes nest: every `set_admin_mode`
/// pushes the previous mode, every `restore_previous_mode` pops it.
#[derive(Debug)]
pub struct ExecutionContext {
    principal: Principal,
    mode: Mutex<ModeState>,
}

impl ExecutionContext {
    pub fn new(principal: Principal) -> Arc<Self> {
        Arc::new(Self {
            principal,
            mode: Mutex::new(ModeState::default()),
        })
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn is_admin_mode(&self) -> bool {
        self.state().admin
    }

    pub fn set_admin_mode(&self, admin: bool) {
        let mut state = self.state();
        let current = state.admin;
        state.previous.push(current);
        state.admin = admin;
    }

    /// Pop back to the mode active before the last `set_admin_mode`.
    ///
    /// Without a pushed mode this leaves the context in normal mode.
    pub fn restore_previous_mode(&self) {
        let mut state = self.state();
        state.admin = state.previous.pop().unwrap_or(false);
    }

    /// Elevate until the returned guard is dropped.
    pub fn enter_admin_mode(self: &Arc<Self>) -> AdminModeGuard {
        self.set_admin_mode(true);
        tracing::debug!(principal = %self.principal.principal_id, "admin mode entered");
        AdminModeGuard {
            context: Arc::clone(self),
        }
    }

    fn state(&self) -> MutexGuard<'_, ModeState> {
        // Mode flags stay consistent even if a holder panicked.
        self.mode.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Restores the previous privilege mode on drop.
#[derive(Debug)]
#[must_use = "admin mode is revoked as soon as the guard is dropped"]
pub struct AdminModeGuard {
    context: Arc<ExecutionContext>,
}

impl Drop for AdminModeGuard {
    fn drop(&mut self) {
        self.context.restore_previous_mode();
        tracing::debug!(principal = %self.context.principal.principal_id, "admin mode restored");
    }
}
