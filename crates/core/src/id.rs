//! Identifiers used across the bookstore domain.
//!
//! Records are keyed by opaque strings. Generated identifiers are 32 lowercase
//! hex characters (a time-ordered UUID without dashes), but any non-blank string
//! supplied by the host (e.g. `"B1"` in a process request) is a valid id.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Opaque record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    /// Wrap an existing identifier, rejecting blank values.
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::invalid_id("record id cannot be blank"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<RecordId> for RecordId {
    fn as_ref(&self) -> &RecordId {
        self
    }
}

impl From<Uuid> for RecordId {
    fn from(value: Uuid) -> Self {
        Self(value.simple().to_string())
    }
}

/// Implements the common surface of a typed identifier wrapping [`RecordId`].
///
/// The wrapped type must be a tuple struct with a single `RecordId` field.
#[macro_export]
macro_rules! record_id_newtype {
    ($t:ident, $name:literal) => {
        impl $t {
            /// Generate a fresh identifier.
            pub fn generate() -> Self {
                Self($crate::RecordId::generate())
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl ::core::fmt::Display for $t {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::convert::AsRef<$crate::RecordId> for $t {
            fn as_ref(&self) -> &$crate::RecordId {
                &self.0
            }
        }

        impl ::core::convert::From<$crate::RecordId> for $t {
            fn from(value: $crate::RecordId) -> Self {
                Self(value)
            }
        }

        impl ::core::convert::From<$t> for $crate::RecordId {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl ::core::str::FromStr for $t {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                let id = $crate::RecordId::parse(s)
                    .map_err(|e| $crate::DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(id))
            }
        }
    };
}

/// Client (tenant) that owns a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(RecordId);

/// Organization within a client that owns a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(RecordId);

record_id_newtype!(ClientId, "ClientId");
record_id_newtype!(OrgId, "OrgId");
