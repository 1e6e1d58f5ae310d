//! Bookstore catalog records.
//!
//! Plain persisted rows (books, genres, book versions) and the ERP master data
//! they point at (products, categories, units, tax categories). Constructors
//! here are deterministic apart from id generation and timestamps; no IO.

pub mod book;
pub mod book_version;
pub mod product;

pub use book::{Book, BookGenre, BookGenreId, BookId, Genre, GenreId};
pub use book_version::{BookVersion, BookVersionId};
pub use product::{
    Product, ProductCategory, ProductCategoryId, ProductId, ProductReferences, TaxCategory,
    TaxCategoryId, Uom, UomId,
};
