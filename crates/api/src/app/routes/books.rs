use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use bookstore_catalog::BookId;

use crate::app::dto::BookGenresResponse;
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/:id/genres", get(list_book_genres))
}

pub async fn list_book_genres(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let book: BookId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid book id"),
    };

    match services.book_genres(&book) {
        Ok(Some(genres)) => (StatusCode::OK, Json(BookGenresResponse { book, genres })).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "book not found"),
        Err(e) => errors::persistence_error_to_response(e),
    }
}
