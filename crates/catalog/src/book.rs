use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bookstore_core::{ClientId, Entity, OrgId, RecordId, record_id_newtype};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(RecordId);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenreId(RecordId);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookGenreId(RecordId);

record_id_newtype!(BookId, "BookId");
record_id_newtype!(GenreId, "GenreId");
record_id_newtype!(BookGenreId, "BookGenreId");

/// A catalog title. Target of genre batch edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub client: ClientId,
    pub organization: OrgId,
    pub title: String,
    pub active: bool,
}

impl Entity for Book {
    const ENTITY_NAME: &'static str = "BKS_Book";
    type Id = BookId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: GenreId,
    pub client: ClientId,
    pub organization: OrgId,
    pub name: String,
}

impl Entity for Genre {
    const ENTITY_NAME: &'static str = "BKS_Genre";
    type Id = GenreId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Many-to-many link between a book and a genre.
///
/// There is no storage-level uniqueness on (book, genre); writers check for an
/// existing link before inserting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookGenre {
    pub id: BookGenreId,
    pub client: ClientId,
    pub organization: OrgId,
    pub book: BookId,
    pub genre: GenreId,
    pub created_at: DateTime<Utc>,
}

impl BookGenre {
    pub const PROPERTY_BOOK: &'static str = "book";
    pub const PROPERTY_GENRE: &'static str = "genre";

    /// New link owned by the book's client/organization.
    pub fn link(book: &Book, genre: &Genre) -> Self {
        Self {
            id: BookGenreId::generate(),
            client: book.client.clone(),
            organization: book.organization.clone(),
            book: book.id.clone(),
            genre: genre.id.clone(),
            created_at: Utc::now(),
        }
    }
}

impl Entity for BookGenre {
    const ENTITY_NAME: &'static str = "BKS_BookGenre";
    type Id = BookGenreId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
