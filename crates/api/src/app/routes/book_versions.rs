use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use crate::app::dto::CreateBookVersionRequest;
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", post(create_book_version))
}

/// Save a new book version; a product is provisioned when none is given.
pub async fn create_book_version(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<CreateBookVersionRequest>,
) -> axum::response::Response {
    match services.create_book_version(body) {
        Ok(version) => (StatusCode::CREATED, Json(version)).into_response(),
        Err(e) => {
            tracing::warn!("book version rejected: {e}");
            errors::lifecycle_error_to_response(e)
        }
    }
}
