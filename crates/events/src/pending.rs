use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PendingStateError {
    #[error("entity '{entity}' has no property '{property}'")]
    UnknownProperty { entity: &'static str, property: String },

    #[error("failed to serialize pending state for '{entity}': {message}")]
    Serialize { entity: &'static str, message: String },

    #[error("failed to apply pending state to '{entity}': {message}")]
    Deserialize { entity: &'static str, message: String },
}

/// Property values an observer wants written on the in-flight instance.
///
/// Keys are serialized property names; the host merges them into the
/// instance right before it is saved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingState {
    values: BTreeMap<String, JsonValue>,
}

impl PendingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn set(&mut self, property: impl Into<String>, value: JsonValue) {
        self.values.insert(property.into(), value);
    }

    /// Merge the pending values into `target`.
    ///
    /// Every pending property must already exist on the serialized instance.
    pub fn apply_to<E>(&self, entity: &'static str, target: E) -> Result<E, PendingStateError>
    where
        E: Serialize + DeserializeOwned,
    {
        if self.values.is_empty() {
            return Ok(target);
        }

        let mut row = serde_json::to_value(&target).map_err(|e| PendingStateError::Serialize {
            entity,
            message: e.to_string(),
        })?;

        let Some(fields) = row.as_object_mut() else {
            return Err(PendingStateError::Serialize {
                entity,
                message: "instance does not serialize to an object".to_string(),
            });
        };

        for (property, value) in &self.values {
            let Some(slot) = fields.get_mut(property) else {
                return Err(PendingStateError::UnknownProperty {
                    entity,
                    property: property.clone(),
                });
            };
            *slot = value.clone();
        }

        serde_json::from_value(row).map_err(|e| PendingStateError::Deserialize {
            entity,
            message: e.to_string(),
        })
    }
}
