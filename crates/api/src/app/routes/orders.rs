use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use storefront_auth::Principal;
use storefront_orders::{Order, OrderId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_all_orders).post(create_order))
        .route("/mine", get(list_my_orders))
        .route("/:id", get(get_order))
        .route("/:id/status", put(update_order_status))
}

fn parse_order_id(id: &str) -> Result<OrderId, axum::response::Response> {
    id.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id"))
}

fn orders_to_json(orders: &[Order]) -> serde_json::Value {
    serde_json::Value::Array(orders.iter().map(dto::order_to_json).collect())
}

pub async fn create_order(
    Extension(services): Extension<AppServices>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<dto::CreateOrderRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text());
        }
    };

    let request = match dto::to_place_order(body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match services.orders.place_order(&principal, request).await {
        Ok(order) => (StatusCode::CREATED, Json(dto::order_to_json(&order))).into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<AppServices>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id = match parse_order_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.orders.get_order(&principal, order_id).await {
        Ok(order) => (StatusCode::OK, Json(dto::order_to_json(&order))).into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}

pub async fn list_my_orders(
    Extension(services): Extension<AppServices>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    match services.orders.list_my_orders(&principal).await {
        Ok(orders) => (StatusCode::OK, Json(orders_to_json(&orders))).into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}

pub async fn list_all_orders(
    Extension(services): Extension<AppServices>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    match services.orders.list_all_orders(&principal).await {
        Ok(orders) => (StatusCode::OK, Json(orders_to_json(&orders))).into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}

pub async fn update_order_status(
    Extension(services): Extension<AppServices>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateStatusRequest>, JsonRejection>,
) -> axum::response::Response {
    // Non-admins are turned away before the id or body is looked at.
    if !principal.is_admin() {
        return errors::json_error(StatusCode::FORBIDDEN, "unauthorized", "unauthorized");
    }

    let order_id = match parse_order_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text());
        }
    };

    let status = match body.status_name() {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match services.orders.update_status(&principal, order_id, status).await {
        Ok(order) => (StatusCode::OK, Json(dto::order_to_json(&order))).into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}
