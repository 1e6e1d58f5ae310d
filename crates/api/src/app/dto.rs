use serde::{Deserialize, Serialize};

use bookstore_catalog::{BookId, BookVersionId, GenreId, ProductId};
use bookstore_core::{ClientId, OrgId};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /book-versions`. Missing ownership falls back to the host's
/// configured client/organization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookVersionRequest {
    #[serde(default)]
    pub id: Option<BookVersionId>,
    #[serde(default)]
    pub client: Option<ClientId>,
    #[serde(default)]
    pub organization: Option<OrgId>,
    #[serde(default)]
    pub book: Option<BookId>,
    pub name: String,
    pub search_key: String,
    #[serde(default)]
    pub product: Option<ProductId>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct BookGenresResponse {
    pub book: BookId,
    pub genres: Vec<GenreId>,
}
