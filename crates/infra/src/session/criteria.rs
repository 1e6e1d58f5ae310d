use core::marker::PhantomData;

use serde::Serialize;
use serde_json::Value as JsonValue;

use bookstore_core::Entity;

use super::r#trait::{PersistenceError, Session, decode};

/// Equality restriction on a serialized property.
#[derive(Debug, Clone, PartialEq)]
pub struct Restriction {
    pub property: String,
    pub value: JsonValue,
}

/// Untyped query: all restrictions must match, optionally capped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    restrictions: Vec<Restriction>,
    max_results: Option<usize>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, property: impl Into<String>, value: JsonValue) -> Self {
        self.restrictions.push(Restriction {
            property: property.into(),
            value,
        });
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    pub fn restrictions(&self) -> &[Restriction] {
        &self.restrictions
    }

    pub fn limit(&self) -> Option<usize> {
        self.max_results
    }

    /// A row missing a restricted property never matches.
    pub fn matches(&self, row: &JsonValue) -> bool {
        self.restrictions
            .iter()
            .all(|r| row.get(&r.property) == Some(&r.value))
    }
}

/// Typed query builder bound to a session.
///
/// ```ignore
/// let links = session
///     .criteria::<BookGenre>()
///     .eq(BookGenre::PROPERTY_BOOK, &book.id)
///     .eq(BookGenre::PROPERTY_GENRE, &genre.id)
///     .list()?;
/// ```
pub struct TypedCriteria<'s, S: ?Sized, E> {
    session: &'s S,
    criteria: Criteria,
    error: Option<PersistenceError>,
    _entity: PhantomData<fn() -> E>,
}

impl<'s, S, E> TypedCriteria<'s, S, E>
where
    S: Session + ?Sized,
    E: Entity,
{
    pub fn new(session: &'s S) -> Self {
        Self {
            session,
            criteria: Criteria::new(),
            error: None,
            _entity: PhantomData,
        }
    }

    pub fn eq<V: Serialize + ?Sized>(mut self, property: &str, value: &V) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => self.criteria = self.criteria.eq(property, v),
            Err(e) => {
                self.error.get_or_insert(PersistenceError::Serialization {
                    entity: E::ENTITY_NAME,
                    message: format!("restriction on '{property}': {e}"),
                });
            }
        }
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.criteria = self.criteria.max_results(max);
        self
    }

    pub fn list(self) -> Result<Vec<E>, PersistenceError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        self.session
            .query(E::ENTITY_NAME, &self.criteria)?
            .into_iter()
            .map(decode::<E>)
            .collect()
    }

    pub fn count(self) -> Result<usize, PersistenceError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        Ok(self.session.query(E::ENTITY_NAME, &self.criteria)?.len())
    }

    /// First matching row, if any.
    pub fn first(self) -> Result<Option<E>, PersistenceError> {
        Ok(self.max_results(1).list()?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_restrictions_must_match() {
        let c = Criteria::new().eq("book", json!("B1")).eq("genre", json!("G1"));
        assert!(c.matches(&json!({"book": "B1", "genre": "G1", "id": "x"})));
        assert!(!c.matches(&json!({"book": "B1", "genre": "G2"})));
    }

    #[test]
    fn missing_property_never_matches() {
        let c = Criteria::new().eq("name", json!("Unit"));
        assert!(!c.matches(&json!({"symbol": "u"})));
    }

    #[test]
    fn null_restriction_matches_explicit_null() {
        let c = Criteria::new().eq("product", JsonValue::Null);
        assert!(c.matches(&json!({"product": null})));
        assert!(!c.matches(&json!({"product": "P1"})));
    }

    #[test]
    fn empty_criteria_matches_everything() {
        assert!(Criteria::new().matches(&json!({})));
    }
}
