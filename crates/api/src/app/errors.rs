use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tradepost_infra::ServiceError;

/// Map a service failure onto the wire contract.
///
/// Store failures surface as an opaque `store_error`; the backend detail
/// goes to the log, never to the client.
pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ServiceError::DuplicateItem(msg) => json_error(StatusCode::BAD_REQUEST, "duplicate_item", msg),
        ServiceError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        ServiceError::Persistence(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "storage backend failed",
            )
        }
        ServiceError::Retraction { order, source } => {
            tracing::error!(order_id = %order.id(), error = %source, "checkout cleanup failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "retraction_incomplete",
                format!(
                    "order {} was recorded but cleanup did not finish",
                    order.id()
                ),
            )
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
