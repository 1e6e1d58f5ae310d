use chrono::{DateTime, Utc};
use serde::Serialize;

use bookstore_core::Entity;

use crate::pending::{PendingState, PendingStateError};

/// Notification that a new instance of `E` is about to be persisted.
///
/// Observers inspect the target and may stage property changes through
/// [`EntityNewEvent::set_current_state`]; the host applies them in the same
/// unit of work as the insert.
#[derive(Debug, Clone)]
pub struct EntityNewEvent<E> {
    target: E,
    pending: PendingState,
    occurred_at: DateTime<Utc>,
}

impl<E: Entity> EntityNewEvent<E> {
    pub fn new(target: E) -> Self {
        Self {
            target,
            pending: PendingState::new(),
            occurred_at: Utc::now(),
        }
    }

    pub fn entity_name(&self) -> &'static str {
        E::ENTITY_NAME
    }

    pub fn target(&self) -> &E {
        &self.target
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn pending(&self) -> &PendingState {
        &self.pending
    }

    /// Stage a new value for `property` on the instance being saved.
    pub fn set_current_state<V: Serialize>(
        &mut self,
        property: &str,
        value: &V,
    ) -> Result<(), PendingStateError> {
        let value = serde_json::to_value(value).map_err(|e| PendingStateError::Serialize {
            entity: E::ENTITY_NAME,
            message: e.to_string(),
        })?;
        self.pending.set(property, value);
        Ok(())
    }

    /// The instance with all staged changes applied.
    pub fn into_current_state(self) -> Result<E, PendingStateError> {
        self.pending.apply_to(E::ENTITY_NAME, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_catalog::{BookVersion, ProductId};

    fn version() -> BookVersion {
        BookVersion {
            id: "BV1".parse().unwrap(),
            client: "C1".parse().unwrap(),
            organization: "O1".parse().unwrap(),
            book: None,
            name: "Dune".to_string(),
            search_key: "DUNE".to_string(),
            product: None,
        }
    }

    #[test]
    fn event_is_stamped_with_entity_name_and_time() {
        let before = Utc::now();
        let event = EntityNewEvent::new(version());
        assert_eq!(event.entity_name(), "BKS_BookVersion");
        assert!(event.occurred_at() >= before);
        assert!(event.occurred_at() <= Utc::now());
    }

    #[test]
    fn untouched_event_yields_original_instance() {
        let event = EntityNewEvent::new(version());
        assert!(event.pending().is_empty());
        assert_eq!(event.into_current_state().unwrap(), version());
    }

    #[test]
    fn staged_property_is_applied() {
        let mut event = EntityNewEvent::new(version());
        let product: ProductId = "P1".parse().unwrap();
        event
            .set_current_state(BookVersion::PROPERTY_PRODUCT, &Some(product.clone()))
            .unwrap();

        // The target itself stays untouched until the host applies the state.
        assert!(event.target().product.is_none());
        assert_eq!(event.into_current_state().unwrap().product, Some(product));
    }

    #[test]
    fn unknown_property_is_rejected_on_apply() {
        let mut event = EntityNewEvent::new(version());
        event.set_current_state("isbn", &"978-0441013593").unwrap();

        let err = event.into_current_state().unwrap_err();
        assert!(matches!(
            err,
            PendingStateError::UnknownProperty { entity: "BKS_BookVersion", .. }
        ));
    }

    #[test]
    fn ill_typed_value_is_rejected_on_apply() {
        let mut event = EntityNewEvent::new(version());
        event.set_current_state("name", &42).unwrap();
        assert!(matches!(
            event.into_current_state(),
            Err(PendingStateError::Deserialize { .. })
        ));
    }
}
