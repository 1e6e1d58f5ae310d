//! Lookup capability for the master data provisioning depends on.

use bookstore_catalog::{ProductCategory, TaxCategory, Uom, UomId};
use bookstore_infra::session::{PersistenceError, Session, SessionExt};

/// Resolves reference records by their configured keys.
///
/// Each lookup returns the first match; keys are expected to be unique.
pub trait ReferenceData {
    fn product_category_by_search_key(
        &self,
        search_key: &str,
    ) -> Result<Option<ProductCategory>, PersistenceError>;

    fn uom_by_name(&self, name: &str) -> Result<Option<Uom>, PersistenceError>;

    fn uom_by_id(&self, id: &UomId) -> Result<Option<Uom>, PersistenceError>;

    fn tax_category_by_name(&self, name: &str) -> Result<Option<TaxCategory>, PersistenceError>;
}

impl<S: Session + ?Sized> ReferenceData for S {
    fn product_category_by_search_key(
        &self,
        search_key: &str,
    ) -> Result<Option<ProductCategory>, PersistenceError> {
        self.criteria::<ProductCategory>()
            .eq(ProductCategory::PROPERTY_SEARCH_KEY, search_key)
            .first()
    }

    fn uom_by_name(&self, name: &str) -> Result<Option<Uom>, PersistenceError> {
        self.criteria::<Uom>().eq(Uom::PROPERTY_NAME, name).first()
    }

    fn uom_by_id(&self, id: &UomId) -> Result<Option<Uom>, PersistenceError> {
        self.get::<Uom>(id)
    }

    fn tax_category_by_name(&self, name: &str) -> Result<Option<TaxCategory>, PersistenceError> {
        self.criteria::<TaxCategory>()
            .eq(TaxCategory::PROPERTY_NAME, name)
            .first()
    }
}
