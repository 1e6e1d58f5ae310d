use std::sync::Arc;

use axum::{Json, Router, extract::Extension, routing::post};

use bookstore_hooks::ProcessResponse;

use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/edit-book-genres", post(edit_book_genres))
}

/// Always answers 200; the envelope carries success, retry or error.
pub async fn edit_book_genres(
    Extension(services): Extension<Arc<AppServices>>,
    body: String,
) -> Json<ProcessResponse> {
    Json(services.edit_book_genres(&body))
}
