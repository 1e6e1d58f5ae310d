//! Shared fixtures for hook tests.

use std::sync::Arc;

use bookstore_auth::{ExecutionContext, Permission, Principal};
use bookstore_catalog::{
    Book, BookGenre, BookVersion, Genre, Product, ProductCategory, ProductId, TaxCategory, Uom,
};
use bookstore_core::Entity;
use bookstore_infra::session::{InMemoryDatabase, InMemorySession, Session, SessionExt};

pub const CLIENT: &str = "C1";
pub const ORG: &str = "O1";

pub struct Fixture {
    pub db: Arc<InMemoryDatabase>,
}

impl Fixture {
    pub fn empty() -> Self {
        Self {
            db: Arc::new(InMemoryDatabase::new()),
        }
    }

    /// Category "Book", UOM "Unit" (id 100) and tax category "Exempt".
    pub fn with_reference_data() -> Self {
        let fx = Self::empty();
        let mut s = fx.admin_session();
        s.save(&ProductCategory {
            id: "CAT-BOOK".parse().unwrap(),
            client: CLIENT.parse().unwrap(),
            organization: "0".parse().unwrap(),
            search_key: "Book".to_string(),
            name: "Books".to_string(),
        })
        .unwrap();
        s.save(&Uom {
            id: "100".parse().unwrap(),
            name: "Unit".to_string(),
            symbol: "Ea".to_string(),
        })
        .unwrap();
        s.save(&TaxCategory {
            id: "TAX-EXEMPT".parse().unwrap(),
            client: CLIENT.parse().unwrap(),
            organization: "0".parse().unwrap(),
            name: "Exempt".to_string(),
        })
        .unwrap();
        s.flush().unwrap();
        fx
    }

    /// Books B1, B2 and genres G1, G2, G3.
    pub fn with_books_and_genres() -> Self {
        let fx = Self::empty();
        let mut s = fx.admin_session();
        for (id, title) in [("B1", "Dune"), ("B2", "Emma")] {
            s.save(&Book {
                id: id.parse().unwrap(),
                client: CLIENT.parse().unwrap(),
                organization: ORG.parse().unwrap(),
                title: title.to_string(),
                active: true,
            })
            .unwrap();
        }
        for (id, name) in [("G1", "Science Fiction"), ("G2", "Romance"), ("G3", "Classics")] {
            s.save(&Genre {
                id: id.parse().unwrap(),
                client: CLIENT.parse().unwrap(),
                organization: "0".parse().unwrap(),
                name: name.to_string(),
            })
            .unwrap();
        }
        s.flush().unwrap();
        fx
    }

    /// Runs with the wildcard permission.
    pub fn admin_session(&self) -> InMemorySession {
        self.db
            .session(ExecutionContext::new(Principal::system(CLIENT.parse().unwrap())))
    }

    /// May write book versions and products, but not genre links.
    pub fn clerk_session(&self) -> InMemorySession {
        let clerk = Principal::new(
            CLIENT.parse().unwrap(),
            vec![
                Permission::write(BookVersion::ENTITY_NAME),
                Permission::write(Product::ENTITY_NAME),
            ],
        );
        self.db.session(ExecutionContext::new(clerk))
    }

    /// Store a link directly, bypassing duplicate checks.
    pub fn link(&self, book_id: &str, genre_id: &str) {
        let mut s = self.admin_session();
        let book = s.get::<Book>(&book_id.parse().unwrap()).unwrap().unwrap();
        let genre = s.get::<Genre>(&genre_id.parse().unwrap()).unwrap().unwrap();
        s.save(&BookGenre::link(&book, &genre)).unwrap();
        s.flush().unwrap();
    }

    /// Committed links as (book, genre) pairs, sorted.
    pub fn links(&self) -> Vec<(String, String)> {
        let mut links: Vec<_> = self
            .committed::<BookGenre>()
            .into_iter()
            .map(|l| (l.book.as_str().to_string(), l.genre.as_str().to_string()))
            .collect();
        links.sort();
        links
    }

    pub fn committed<E: Entity>(&self) -> Vec<E> {
        self.db
            .rows(E::ENTITY_NAME)
            .unwrap()
            .into_iter()
            .map(|row| serde_json::from_value(row).unwrap())
            .collect()
    }
}

pub fn book_version(id: &str, product: Option<ProductId>) -> BookVersion {
    BookVersion {
        id: id.parse().unwrap(),
        client: CLIENT.parse().unwrap(),
        organization: ORG.parse().unwrap(),
        book: Some("B1".parse().unwrap()),
        name: format!("Dune {id}"),
        search_key: format!("DUNE-{id}"),
        product,
    }
}
