//! Product provisioning for new book versions.

use thiserror::Error;

use bookstore_catalog::{BookVersion, Product, ProductReferences, Uom, UomId};
use bookstore_events::{EntityNewEvent, PendingStateError};
use bookstore_infra::lifecycle::EntityNewObserver;
use bookstore_infra::session::{PersistenceError, Session, SessionExt};

use crate::config::ProvisioningConfig;
use crate::reference::ReferenceData;

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("product category '{0}' not found")]
    MissingCategory(String),

    #[error("UOM '{name}' not found (fallback {fallback:?})")]
    MissingUom { name: String, fallback: Option<UomId> },

    #[error("tax category '{0}' not found")]
    MissingTaxCategory(String),

    #[error(transparent)]
    PendingState(#[from] PendingStateError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Creates the sellable product of a book version saved without one.
///
/// Runs inside the host's unit of work: the product row and the version's
/// product reference are committed (or rolled back) together with the version.
#[derive(Debug, Clone, Default)]
pub struct ProductProvisioner {
    config: ProvisioningConfig,
}

impl ProductProvisioner {
    pub fn new(config: ProvisioningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProvisioningConfig {
        &self.config
    }

    /// Returns the created product, or `None` when the version already has one.
    pub fn provision(
        &self,
        session: &mut dyn Session,
        event: &mut EntityNewEvent<BookVersion>,
    ) -> Result<Option<Product>, ProvisioningError> {
        let version = event.target();

        if version.has_product() {
            tracing::debug!(
                book_version = %version.name,
                "book version already has an associated product, skipping creation"
            );
            return Ok(None);
        }

        tracing::info!(book_version = %version.name, "creating product for book version");

        let refs = self.resolve_references(session)?;
        let product = Product::for_book_version(version, refs);
        session.save(&product)?;
        event.set_current_state(BookVersion::PROPERTY_PRODUCT, &Some(&product.id))?;

        tracing::info!(
            product = %product.search_key,
            book_version = %event.target().name,
            "product created and associated with book version"
        );
        Ok(Some(product))
    }

    fn resolve_references(&self, session: &dyn Session) -> Result<ProductReferences, ProvisioningError> {
        let category = session
            .product_category_by_search_key(&self.config.product_category)?
            .ok_or_else(|| ProvisioningError::MissingCategory(self.config.product_category.clone()))?;

        let uom = match session.uom_by_name(&self.config.uom_name)? {
            Some(uom) => uom,
            None => self.fallback_uom(session)?,
        };

        let tax = session
            .tax_category_by_name(&self.config.tax_category)?
            .ok_or_else(|| ProvisioningError::MissingTaxCategory(self.config.tax_category.clone()))?;

        Ok(ProductReferences {
            category: category.id,
            uom: uom.id,
            tax_category: tax.id,
        })
    }

    fn fallback_uom(&self, session: &dyn Session) -> Result<Uom, ProvisioningError> {
        let missing = || ProvisioningError::MissingUom {
            name: self.config.uom_name.clone(),
            fallback: self.config.uom_fallback_id.clone(),
        };

        let Some(fallback_id) = &self.config.uom_fallback_id else {
            return Err(missing());
        };

        let uom = session.uom_by_id(fallback_id)?.ok_or_else(missing)?;
        tracing::warn!(
            uom_name = %self.config.uom_name,
            fallback = %fallback_id,
            "unit of measure not found by name, using fallback record"
        );
        Ok(uom)
    }
}

impl EntityNewObserver<BookVersion> for ProductProvisioner {
    fn name(&self) -> &'static str {
        "ProductProvisioner"
    }

    fn on_new(&self, session: &mut dyn Session, event: &mut EntityNewEvent<BookVersion>) -> anyhow::Result<()> {
        self.provision(session, event)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{Fixture, book_version};
    use bookstore_infra::lifecycle::{EntityLifecycle, LifecycleError};

    fn lifecycle(config: ProvisioningConfig) -> EntityLifecycle<BookVersion> {
        EntityLifecycle::<BookVersion>::new().register(Arc::new(ProductProvisioner::new(config)))
    }

    fn products(fx: &Fixture) -> Vec<Product> {
        fx.committed::<Product>()
    }

    #[test]
    fn new_version_without_product_gets_one() {
        let fx = Fixture::with_reference_data();
        let mut session = fx.clerk_session();

        let saved = lifecycle(ProvisioningConfig::default())
            .persist_new(&mut session, book_version("BV1", None))
            .unwrap();

        let products = products(&fx);
        assert_eq!(products.len(), 1);
        let product = &products[0];
        assert_eq!(saved.product.as_ref(), Some(&product.id));
        assert!(product.active);
        assert!(!product.stocked);
        assert!(!product.production);
        assert_eq!(product.name, saved.name);
        assert_eq!(product.search_key, saved.search_key);
        assert_eq!(product.client, saved.client);
        assert_eq!(product.organization, saved.organization);
        assert_eq!(product.product_category.as_str(), "CAT-BOOK");
        assert_eq!(product.uom.as_str(), "100");
        assert_eq!(product.tax_category.as_str(), "TAX-EXEMPT");
    }

    #[test]
    fn stored_version_points_at_the_new_product() {
        let fx = Fixture::with_reference_data();
        let mut session = fx.clerk_session();

        lifecycle(ProvisioningConfig::default())
            .persist_new(&mut session, book_version("BV1", None))
            .unwrap();

        let versions = fx.committed::<BookVersion>();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].product.as_ref(), Some(&products(&fx)[0].id));
    }

    #[test]
    fn version_with_product_is_left_alone() {
        let fx = Fixture::with_reference_data();
        let mut session = fx.clerk_session();
        let existing = "P-EXISTING".parse().unwrap();

        let saved = lifecycle(ProvisioningConfig::default())
            .persist_new(&mut session, book_version("BV1", Some(existing)))
            .unwrap();

        assert!(products(&fx).is_empty());
        assert_eq!(saved.product.as_ref().map(|p| p.as_str()), Some("P-EXISTING"));
    }

    #[test]
    fn provisioning_is_skipped_without_reference_lookups_when_product_set() {
        // No reference data at all: a version that already has a product must still save.
        let fx = Fixture::empty();
        let mut session = fx.clerk_session();

        let result = lifecycle(ProvisioningConfig::default())
            .persist_new(&mut session, book_version("BV1", Some("P1".parse().unwrap())));

        assert!(result.is_ok());
    }

    #[test]
    fn missing_category_aborts_the_save() {
        let fx = Fixture::with_reference_data();
        let mut session = fx.clerk_session();
        let config = ProvisioningConfig {
            product_category: "Magazine".to_string(),
            ..ProvisioningConfig::default()
        };

        let err = lifecycle(config)
            .persist_new(&mut session, book_version("BV1", None))
            .unwrap_err();

        let LifecycleError::Observer { source, .. } = err else {
            panic!("expected observer failure");
        };
        assert!(matches!(
            source.downcast_ref::<ProvisioningError>(),
            Some(ProvisioningError::MissingCategory(key)) if key == "Magazine"
        ));
        assert!(products(&fx).is_empty());
        assert!(fx.committed::<BookVersion>().is_empty());
    }

    #[test]
    fn missing_tax_category_aborts_the_save() {
        let fx = Fixture::with_reference_data();
        let mut session = fx.clerk_session();
        let config = ProvisioningConfig {
            tax_category: "Luxury".to_string(),
            ..ProvisioningConfig::default()
        };

        let err = lifecycle(config)
            .persist_new(&mut session, book_version("BV1", None))
            .unwrap_err();

        assert!(err.to_string().contains("tax category 'Luxury' not found"));
        assert!(products(&fx).is_empty());
        assert!(fx.committed::<BookVersion>().is_empty());
    }

    #[test]
    fn unknown_uom_name_falls_back_to_configured_record() {
        let fx = Fixture::with_reference_data();
        let mut session = fx.clerk_session();
        let config = ProvisioningConfig {
            uom_name: "Piece".to_string(),
            ..ProvisioningConfig::default()
        };

        lifecycle(config)
            .persist_new(&mut session, book_version("BV1", None))
            .unwrap();

        assert_eq!(products(&fx)[0].uom.as_str(), "100");
    }

    #[test]
    fn unknown_uom_without_fallback_aborts_the_save() {
        let fx = Fixture::with_reference_data();
        let mut session = fx.clerk_session();
        let config = ProvisioningConfig {
            uom_name: "Piece".to_string(),
            uom_fallback_id: None,
            ..ProvisioningConfig::default()
        };

        let err = lifecycle(config)
            .persist_new(&mut session, book_version("BV1", None))
            .unwrap_err();

        assert!(err.to_string().contains("UOM 'Piece' not found"));
        assert!(products(&fx).is_empty());
    }

    #[test]
    fn dangling_uom_fallback_aborts_the_save() {
        let fx = Fixture::with_reference_data();
        let mut session = fx.clerk_session();
        let config = ProvisioningConfig {
            uom_name: "Piece".to_string(),
            uom_fallback_id: Some("999".parse().unwrap()),
            ..ProvisioningConfig::default()
        };

        let err = lifecycle(config)
            .persist_new(&mut session, book_version("BV1", None))
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("UOM 'Piece' not found"));
        assert!(message.contains("999"));
        assert!(products(&fx).is_empty());
    }

    #[test]
    fn blank_version_name_is_copied_to_the_product() {
        let fx = Fixture::with_reference_data();
        let mut session = fx.clerk_session();
        let mut version = book_version("BV1", None);
        version.name = " ".to_string();
        version.search_key = String::new();

        let saved = lifecycle(ProvisioningConfig::default())
            .persist_new(&mut session, version)
            .unwrap();

        let products = products(&fx);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, " ");
        assert_eq!(products[0].search_key, "");
        assert_eq!(saved.product.as_ref(), Some(&products[0].id));
        assert_eq!(fx.committed::<BookVersion>().len(), 1);
    }

    #[test]
    fn each_new_version_gets_its_own_product() {
        let fx = Fixture::with_reference_data();
        let mut session = fx.clerk_session();
        let lifecycle = lifecycle(ProvisioningConfig::default());

        lifecycle.persist_new(&mut session, book_version("BV1", None)).unwrap();
        lifecycle.persist_new(&mut session, book_version("BV2", None)).unwrap();

        let products = products(&fx);
        assert_eq!(products.len(), 2);
        assert_ne!(products[0].id, products[1].id);
        assert_eq!(fx.committed::<BookVersion>().len(), 2);
    }
}
