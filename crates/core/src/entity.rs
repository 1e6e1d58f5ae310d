//! Entity trait: identity + a stable persisted name.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::id::RecordId;

/// A persisted record.
///
/// Rows are stored as their serde representation, so every property name used
/// in a query must match the serialized field name.
pub trait Entity: Serialize + DeserializeOwned {
    /// Stable entity name (table / permission scope).
    const ENTITY_NAME: &'static str;

    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + AsRef<RecordId>;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
