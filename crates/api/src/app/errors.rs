use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use storefront_infra::OrderError;

pub fn order_error_to_response(err: OrderError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        OrderError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        OrderError::InvalidStatus(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_status", msg),
        OrderError::ProductNotFound {
            line_no,
            product_id,
        } => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({
                "error": "product_not_found",
                "message": message,
                "line_no": line_no,
                "product_id": product_id.to_string(),
            })),
        )
            .into_response(),
        OrderError::InsufficientStock {
            line_no,
            product_id,
            requested,
            available,
        } => (
            StatusCode::CONFLICT,
            axum::Json(json!({
                "error": "insufficient_stock",
                "message": message,
                "line_no": line_no,
                "product_id": product_id.to_string(),
                "requested": requested,
                "available": available,
            })),
        )
            .into_response(),
        OrderError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        OrderError::Unauthorized => json_error(StatusCode::FORBIDDEN, "unauthorized", "unauthorized"),
        OrderError::Persistence(msg) => {
            // Store details stay in the logs.
            error!(error = %msg, "persistence failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "persistence_error",
                "storage failure; please retry",
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
