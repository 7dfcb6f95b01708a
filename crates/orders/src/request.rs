//! Validated order-placement input.
//!
//! Everything here is checked before any stock is touched.

use serde::{Deserialize, Serialize};

use storefront_catalog::ProductId;
use storefront_core::{DomainError, DomainResult};

/// Free-form shipping address; every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    pub fn validate(&self) -> DomainResult<()> {
        let fields = [
            ("address", &self.address),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "shipping_address.{name} is required"
                )));
            }
        }
        Ok(())
    }
}

/// Opaque payment label (recorded, never processed).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethod(String);

impl PaymentMethod {
    pub fn new(label: impl Into<String>) -> DomainResult<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(DomainError::validation("payment_method is required"));
        }
        Ok(Self(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One requested cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A placement request that passed shape validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrder {
    lines: Vec<LineRequest>,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
}

impl PlaceOrder {
    pub fn new(
        lines: Vec<LineRequest>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("at least one line item is required"));
        }
        if let Some(pos) = lines.iter().position(|l| l.quantity == 0) {
            return Err(DomainError::validation(format!(
                "line {}: quantity must be positive",
                pos + 1
            )));
        }
        shipping_address.validate()?;

        Ok(Self {
            lines,
            shipping_address,
            payment_method,
        })
    }

    /// Lines in caller order; reservation follows this order.
    pub fn lines(&self) -> &[LineRequest] {
        &self.lines
    }

    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    pub fn payment_method(&self) -> &PaymentMethod {
        &self.payment_method
    }
}
