use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookstore_core::ClientId;

use crate::Permission;

/// Identity of the actor a session runs as (user, service account, etc).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PrincipalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// A resolved principal acting within one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub principal_id: PrincipalId,
    pub client_id: ClientId,
    pub permissions: Vec<Permission>,
}

impl Principal {
    pub fn new(client_id: ClientId, permissions: Vec<Permission>) -> Self {
        Self {
            principal_id: PrincipalId::new(),
            client_id,
            permissions,
        }
    }

    /// Principal holding the wildcard permission.
    pub fn system(client_id: ClientId) -> Self {
        Self::new(client_id, vec![Permission::wildcard()])
    }

    pub fn has_permission(&self, required: &Permission) -> bool {
        self.permissions
            .iter()
            .any(|p| p.is_wildcard() || p == required)
    }
}
