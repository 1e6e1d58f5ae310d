//! Service wiring: in-memory database, save lifecycle, process handlers.

use std::sync::Arc;

use bookstore_auth::{ExecutionContext, Permission, Principal};
use bookstore_catalog::{
    Book, BookGenre, BookId, BookVersion, Genre, GenreId, Product, ProductCategory, ProductId,
    TaxCategory, Uom,
};
use bookstore_core::{Entity, RecordId};
use bookstore_hooks::{GenreBatchEditor, ProcessActionHandler, ProcessResponse, ProductProvisioner};
use bookstore_infra::lifecycle::{EntityLifecycle, LifecycleError};
use bookstore_infra::session::{InMemoryDatabase, InMemorySession, PersistenceError, Session, SessionExt};

use crate::app::dto::CreateBookVersionRequest;
use crate::config::ApiConfig;

pub struct AppServices {
    config: ApiConfig,
    db: Arc<InMemoryDatabase>,
    book_versions: EntityLifecycle<BookVersion>,
    edit_book_genres: GenreBatchEditor,
}

/// Wire services and seed the reference data product provisioning resolves.
pub fn build_services(config: ApiConfig) -> Result<AppServices, PersistenceError> {
    let provisioner = Arc::new(ProductProvisioner::new(config.provisioning.clone()));
    let services = AppServices {
        db: Arc::new(InMemoryDatabase::new()),
        book_versions: EntityLifecycle::<BookVersion>::new().register(provisioner),
        edit_book_genres: GenreBatchEditor::new(),
        config,
    };
    services.seed_reference_data()?;
    Ok(services)
}

impl AppServices {
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Session for an incoming request.
    ///
    /// Requests run as a clerk who may save book versions and products but has
    /// no direct write access to genre links.
    pub fn request_session(&self) -> InMemorySession {
        let clerk = Principal::new(
            self.config.client.clone(),
            vec![
                Permission::write(BookVersion::ENTITY_NAME),
                Permission::write(Product::ENTITY_NAME),
            ],
        );
        self.db.session(ExecutionContext::new(clerk))
    }

    /// Session with unrestricted write access (seeding, maintenance).
    pub fn system_session(&self) -> InMemorySession {
        self.db
            .session(ExecutionContext::new(Principal::system(self.config.client.clone())))
    }

    pub fn create_book_version(&self, req: CreateBookVersionRequest) -> Result<BookVersion, LifecycleError> {
        let version = BookVersion {
            id: req.id.unwrap_or_else(|| RecordId::generate().into()),
            client: req.client.unwrap_or_else(|| self.config.client.clone()),
            organization: req.organization.unwrap_or_else(|| self.config.organization.clone()),
            book: req.book,
            name: req.name,
            search_key: req.search_key,
            product: req.product,
        };

        let mut session = self.request_session();
        self.book_versions.persist_new(&mut session, version)
    }

    pub fn product(&self, id: &ProductId) -> Result<Option<Product>, PersistenceError> {
        self.request_session().get::<Product>(id)
    }

    pub fn edit_book_genres(&self, content: &str) -> ProcessResponse {
        let mut session = self.request_session();
        self.edit_book_genres.execute(&mut session, content)
    }

    /// Genres linked to a book, or `None` when the book does not exist.
    pub fn book_genres(&self, id: &BookId) -> Result<Option<Vec<GenreId>>, PersistenceError> {
        let session = self.request_session();
        if session.get::<Book>(id)?.is_none() {
            return Ok(None);
        }

        let mut genres: Vec<GenreId> = session
            .criteria::<BookGenre>()
            .eq(BookGenre::PROPERTY_BOOK, id)
            .list()?
            .into_iter()
            .map(|link| link.genre)
            .collect();
        genres.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        genres.dedup();
        Ok(Some(genres))
    }

    /// Store books and genres owned by the configured client/organization.
    pub fn seed_catalog(&self, books: &[(&str, &str)], genres: &[(&str, &str)]) -> Result<(), PersistenceError> {
        let mut session = self.system_session();
        for (id, title) in books {
            session.save(&Book {
                id: parse_id(Book::ENTITY_NAME, id)?,
                client: self.config.client.clone(),
                organization: self.config.organization.clone(),
                title: title.to_string(),
                active: true,
            })?;
        }
        for (id, name) in genres {
            session.save(&Genre {
                id: parse_id(Genre::ENTITY_NAME, id)?,
                client: self.config.client.clone(),
                organization: self.config.organization.clone(),
                name: name.to_string(),
            })?;
        }
        session.flush()?;
        tracing::info!(books = books.len(), genres = genres.len(), "catalog seeded");
        Ok(())
    }

    fn seed_reference_data(&self) -> Result<(), PersistenceError> {
        let provisioning = &self.config.provisioning;
        let mut session = self.system_session();

        session.save(&ProductCategory {
            id: RecordId::generate().into(),
            client: self.config.client.clone(),
            organization: self.config.organization.clone(),
            search_key: provisioning.product_category.clone(),
            name: provisioning.product_category.clone(),
        })?;

        let uom_id = provisioning
            .uom_fallback_id
            .clone()
            .unwrap_or_else(|| RecordId::generate().into());
        session.save(&Uom {
            id: uom_id,
            name: provisioning.uom_name.clone(),
            symbol: provisioning.uom_name.chars().take(3).collect(),
        })?;

        session.save(&TaxCategory {
            id: RecordId::generate().into(),
            client: self.config.client.clone(),
            organization: self.config.organization.clone(),
            name: provisioning.tax_category.clone(),
        })?;

        session.flush()?;
        tracing::info!(
            product_category = %provisioning.product_category,
            uom = %provisioning.uom_name,
            tax_category = %provisioning.tax_category,
            "reference data seeded"
        );
        Ok(())
    }
}

fn parse_id<T: From<RecordId>>(entity: &'static str, id: &str) -> Result<T, PersistenceError> {
    RecordId::parse(id)
        .map(T::from)
        .map_err(|e| PersistenceError::Serialization {
            entity,
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services() -> AppServices {
        let config = ApiConfig::from_lookup(|_| None).unwrap();
        build_services(config).unwrap()
    }

    fn request(name: &str) -> CreateBookVersionRequest {
        serde_json::from_value(serde_json::json!({"name": name, "searchKey": name.to_uppercase()})).unwrap()
    }

    #[test]
    fn new_book_version_is_provisioned_from_seeded_reference_data() {
        let services = services();
        let version = services.create_book_version(request("Dune")).unwrap();

        let product_id = version.product.clone().unwrap();
        let product = services.product(&product_id).unwrap().unwrap();
        assert_eq!(product.name, "Dune");
        assert_eq!(product.uom.as_str(), "100");
        assert_eq!(product.client, services.config().client);
    }

    #[test]
    fn genre_listing_follows_batch_edits() {
        let services = services();
        services
            .seed_catalog(&[("B1", "Dune")], &[("G1", "Science Fiction"), ("G2", "Classics")])
            .unwrap();

        let response = services.edit_book_genres(
            r#"{"recordIds":["B1"],"_params":{"operation":"ADD","newGenre":"G2"}}"#,
        );
        assert!(response.is_success());

        let genres = services.book_genres(&"B1".parse().unwrap()).unwrap().unwrap();
        assert_eq!(genres, vec!["G2".parse::<GenreId>().unwrap()]);
        assert!(services.book_genres(&"B9".parse().unwrap()).unwrap().is_none());
    }

    #[test]
    fn request_sessions_cannot_write_links_directly() {
        let services = services();
        services.seed_catalog(&[("B1", "Dune")], &[("G1", "Science Fiction")]).unwrap();

        let mut session = services.request_session();
        let book = session.get::<Book>(&"B1".parse().unwrap()).unwrap().unwrap();
        let genre = session.get::<Genre>(&"G1".parse().unwrap()).unwrap().unwrap();
        assert!(matches!(
            session.save(&BookGenre::link(&book, &genre)),
            Err(PersistenceError::Forbidden(_))
        ));
    }
}
