use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::{ProductId, StockDebit};
use storefront_core::{AggregateId, DomainError, DomainResult, Money, UserId};

use crate::request::{PaymentMethod, ShippingAddress};
use crate::status::OrderStatus;

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for OrderId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Frozen line snapshot: product, quantity and the price at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub line_no: u32,
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl LineItem {
    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// A placed order.
///
/// Everything except `status` (and its `updated_at` stamp) is fixed at creation.
/// Deserialization goes through `from_parts`, so snapshot checks still apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OrderRecord")]
pub struct Order {
    id: OrderId,
    customer_id: UserId,
    line_items: Vec<LineItem>,
    total_price: Money,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct OrderRecord {
    id: OrderId,
    customer_id: UserId,
    line_items: Vec<LineItem>,
    total_price: Money,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRecord> for Order {
    type Error = DomainError;

    fn try_from(r: OrderRecord) -> Result<Self, Self::Error> {
        Order::from_parts(
            r.id,
            r.customer_id,
            r.line_items,
            r.total_price,
            r.shipping_address,
            r.payment_method,
            r.status,
            r.created_at,
            r.updated_at,
        )
    }
}

fn sum_lines(lines: &[LineItem]) -> DomainResult<Money> {
    let subtotals = lines
        .iter()
        .map(|l| {
            l.subtotal().ok_or_else(|| {
                DomainError::validation(format!("line {}: price overflow", l.line_no))
            })
        })
        .collect::<DomainResult<Vec<_>>>()?;

    Money::checked_sum(subtotals).ok_or_else(|| DomainError::validation("order total overflow"))
}

impl Order {
    /// Build a new `Pending` order from the debits made during reservation.
    ///
    /// Line numbers follow the order of `debits`; the total is the exact sum of
    /// `unit_price * quantity` over the snapshot.
    pub fn assemble(
        id: OrderId,
        customer_id: UserId,
        debits: &[StockDebit],
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if debits.is_empty() {
            return Err(DomainError::validation("order must contain at least one line item"));
        }

        let line_items = debits
            .iter()
            .enumerate()
            .map(|(idx, d)| LineItem {
                line_no: idx as u32 + 1,
                product_id: d.product_id,
                name: d.name.clone(),
                quantity: d.quantity,
                unit_price: d.unit_price,
            })
            .collect::<Vec<_>>();
        let total_price = sum_lines(&line_items)?;

        Ok(Self {
            id,
            customer_id,
            line_items,
            total_price,
            shipping_address,
            payment_method,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a stored order, re-checking the snapshot invariants.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: OrderId,
        customer_id: UserId,
        line_items: Vec<LineItem>,
        total_price: Money,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        status: OrderStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if line_items.is_empty() {
            return Err(DomainError::invariant(format!("order {id} has no line items")));
        }
        let recomputed = sum_lines(&line_items)?;
        if recomputed != total_price {
            return Err(DomainError::invariant(format!(
                "order {id} total {total_price} does not match line items ({recomputed})"
            )));
        }

        Ok(Self {
            id,
            customer_id,
            line_items,
            total_price,
            shipping_address,
            payment_method,
            status,
            created_at,
            updated_at,
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer_id(&self) -> UserId {
        self.customer_id
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    pub fn payment_method(&self) -> &PaymentMethod {
        &self.payment_method
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.customer_id == user_id
    }

    /// Overwrite the status unconditionally.
    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    /// Newest first; ties broken by id (ids are time-ordered).
    pub fn cmp_recency(a: &Order, b: &Order) -> core::cmp::Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    }
}
