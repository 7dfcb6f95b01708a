use axum::http::StatusCode;
use serde::Deserialize;

use storefront_catalog::{Product, ProductId};
use storefront_infra::OrderError;
use storefront_orders::{InvalidStatus, LineRequest, Order, PaymentMethod, PlaceOrder, ShippingAddress};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub line_items: Vec<OrderLineRequest>,
    pub shipping_address: Option<ShippingAddressRequest>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShippingAddressRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: serde_json::Value,
}

impl UpdateStatusRequest {
    /// A missing or non-string `status` is reported as an invalid status.
    pub fn status_name(&self) -> Result<&str, axum::response::Response> {
        self.status.as_str().ok_or_else(|| {
            errors::order_error_to_response(InvalidStatus(self.status.to_string()).into())
        })
    }
}

fn validation(msg: impl Into<String>) -> axum::response::Response {
    errors::json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
}

/// Shape-check a create-order body into a validated `PlaceOrder`.
///
/// Runs before any stock is touched.
pub fn to_place_order(body: CreateOrderRequest) -> Result<PlaceOrder, axum::response::Response> {
    let mut lines = Vec::with_capacity(body.line_items.len());
    for (idx, l) in body.line_items.into_iter().enumerate() {
        let line_no = idx + 1;
        let product_id: ProductId = match l.product_id.parse() {
            Ok(id) => id,
            Err(_) => return Err(validation(format!("line {line_no}: invalid product id"))),
        };
        if l.quantity <= 0 {
            return Err(validation(format!("line {line_no}: quantity must be positive")));
        }
        let quantity = match u32::try_from(l.quantity) {
            Ok(q) => q,
            Err(_) => return Err(validation(format!("line {line_no}: quantity too large"))),
        };
        lines.push(LineRequest {
            product_id,
            quantity,
        });
    }

    let Some(addr) = body.shipping_address else {
        return Err(validation("shipping_address is required"));
    };
    let Some(payment_method) = body.payment_method else {
        return Err(validation("payment_method is required"));
    };

    let shipping_address = ShippingAddress {
        address: addr.address,
        city: addr.city,
        postal_code: addr.postal_code,
        country: addr.country,
    };

    PaymentMethod::new(payment_method)
        .and_then(|pm| PlaceOrder::new(lines, shipping_address, pm))
        .map_err(|e| errors::order_error_to_response(OrderError::from(e)))
}

// -------------------------
// Response mapping
// -------------------------

pub fn order_to_json(order: &Order) -> serde_json::Value {
    let addr = order.shipping_address();
    serde_json::json!({
        "id": order.id().to_string(),
        "customer_id": order.customer_id().to_string(),
        "status": order.status().as_str(),
        "total_price": order.total_price().to_string(),
        "payment_method": order.payment_method().as_str(),
        "shipping_address": {
            "address": addr.address,
            "city": addr.city,
            "postal_code": addr.postal_code,
            "country": addr.country,
        },
        "line_items": order.line_items().iter().map(|l| serde_json::json!({
            "line_no": l.line_no,
            "product_id": l.product_id.to_string(),
            "name": l.name,
            "quantity": l.quantity,
            "unit_price": l.unit_price.to_string(),
            "subtotal": l.subtotal().map(|m| m.to_string()),
        })).collect::<Vec<_>>(),
        "created_at": order.created_at().to_rfc3339(),
        "updated_at": order.updated_at().to_rfc3339(),
    })
}

pub fn product_to_json(product: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": product.id().to_string(),
        "name": product.name(),
        "price": product.price().to_string(),
        "stock": product.stock(),
    })
}
