use axum::Router;

pub mod book_versions;
pub mod books;
pub mod process;
pub mod products;
pub mod system;

/// Router for all bookstore endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/book-versions", book_versions::router())
        .nest("/books", books::router())
        .nest("/products", products::router())
        .nest("/process", process::router())
}
