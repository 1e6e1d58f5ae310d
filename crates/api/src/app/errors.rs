use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use bookstore_infra::lifecycle::LifecycleError;
use bookstore_infra::session::PersistenceError;

pub fn lifecycle_error_to_response(err: LifecycleError) -> axum::response::Response {
    match err {
        LifecycleError::Observer { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "save_rejected", err.to_string())
        }
        LifecycleError::PendingState(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "pending_state_error", e.to_string())
        }
        LifecycleError::Persistence(e) => persistence_error_to_response(e),
    }
}

pub fn persistence_error_to_response(err: PersistenceError) -> axum::response::Response {
    match err {
        PersistenceError::Forbidden(e) => json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()),
        PersistenceError::Serialization { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_record", err.to_string())
        }
        PersistenceError::Transaction(_) | PersistenceError::Connection(_) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "storage_error", err.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
