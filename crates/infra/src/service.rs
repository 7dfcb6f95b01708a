//! Order service: the application-level orchestration of placement, reads and
//! status transitions.
//!
//! ## Placement flow
//!
//! ```text
//! PlaceOrder (already validated, no side effects so far)
//!   ↓
//! 1. Reserve stock line by line, caller order (atomic per-product debit)
//!      failure at line k → re-credit lines 1..k-1, return error
//!   ↓
//! 2. Assemble order from the debit snapshots (Pending, exact total)
//!   ↓
//! 3. Insert into the ledger
//!      failure in 2 or 3 → re-credit every debited line, return error
//! ```
//!
//! The caller therefore sees all-or-nothing: either the order exists and every
//! line was debited, or nothing changed (modulo a logged release failure).
//!
//! Identity is always an explicit `Principal` argument; nothing here reads
//! ambient session state.

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use storefront_auth::{Principal, authorize_order_read, require_admin};
use storefront_catalog::{Product, ProductId};
use storefront_orders::{Order, OrderId, OrderStatus, PlaceOrder};

use crate::catalog_store::CatalogStore;
use crate::error::OrderError;
use crate::order_ledger::OrderLedger;
use crate::reservation::InventoryReservation;

pub struct OrderService<C, L> {
    catalog: C,
    ledger: L,
}

impl<C, L> OrderService<C, L>
where
    C: CatalogStore,
    L: OrderLedger,
{
    pub fn new(catalog: C, ledger: L) -> Self {
        Self { catalog, ledger }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    #[instrument(
        skip(self, principal, request),
        fields(customer_id = %principal.user_id(), lines = request.lines().len()),
        err(Display)
    )]
    pub async fn place_order(
        &self,
        principal: &Principal,
        request: PlaceOrder,
    ) -> Result<Order, OrderError> {
        let reservation = InventoryReservation::new(&self.catalog);
        let debits = reservation.reserve(request.lines()).await?;

        let order = match Order::assemble(
            OrderId::generate(),
            principal.user_id(),
            &debits,
            request.shipping_address().clone(),
            request.payment_method().clone(),
            Utc::now(),
        ) {
            Ok(order) => order,
            Err(e) => {
                warn!(error = %e, "order assembly failed; releasing reserved stock");
                reservation.release(&debits).await;
                return Err(e.into());
            }
        };

        if let Err(e) = self.ledger.insert(&order).await {
            error!(order_id = %order.id(), error = %e, "order insert failed; releasing reserved stock");
            reservation.release(&debits).await;
            return Err(e.into());
        }

        info!(
            order_id = %order.id(),
            total = %order.total_price(),
            "order placed"
        );
        Ok(order)
    }

    #[instrument(skip(self, principal), fields(user_id = %principal.user_id()), err(Display))]
    pub async fn get_order(&self, principal: &Principal, id: OrderId) -> Result<Order, OrderError> {
        let order = self.ledger.get(id).await?.ok_or(OrderError::NotFound)?;
        authorize_order_read(principal, order.customer_id())?;
        Ok(order)
    }

    #[instrument(skip(self, principal), fields(user_id = %principal.user_id()), err(Display))]
    pub async fn list_my_orders(&self, principal: &Principal) -> Result<Vec<Order>, OrderError> {
        Ok(self.ledger.list_by_customer(principal.user_id()).await?)
    }

    #[instrument(skip(self, principal), fields(user_id = %principal.user_id()), err(Display))]
    pub async fn list_all_orders(&self, principal: &Principal) -> Result<Vec<Order>, OrderError> {
        require_admin(principal)?;
        Ok(self.ledger.list_all().await?)
    }

    /// Admin check first, then the status value, then existence.
    #[instrument(skip(self, principal), fields(user_id = %principal.user_id()), err(Display))]
    pub async fn update_status(
        &self,
        principal: &Principal,
        id: OrderId,
        status: &str,
    ) -> Result<Order, OrderError> {
        require_admin(principal)?;
        let status: OrderStatus = status.parse()?;

        let order = self
            .ledger
            .update_status(id, status, Utc::now())
            .await?
            .ok_or(OrderError::NotFound)?;

        info!(order_id = %id, status = %status, "order status updated");
        Ok(order)
    }

    #[instrument(skip(self), err(Display))]
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, OrderError> {
        Ok(self.catalog.get(id).await?)
    }
}
