use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use storefront_core::UserId;
use storefront_orders::{Order, OrderId, OrderStatus};

use super::OrderLedger;
use crate::error::StoreError;

/// In-memory order ledger for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryOrderLedger {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_sorted<F>(&self, keep: F) -> Result<Vec<Order>, StoreError>
    where
        F: Fn(&Order) -> bool,
    {
        let map = self.orders.read().map_err(|_| StoreError::Poisoned)?;
        let mut out: Vec<Order> = map.values().filter(|o| keep(o)).cloned().collect();
        out.sort_by(Order::cmp_recency);
        Ok(out)
    }
}

#[async_trait]
impl OrderLedger for InMemoryOrderLedger {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let mut map = self.orders.write().map_err(|_| StoreError::Poisoned)?;
        if map.contains_key(&order.id()) {
            return Err(StoreError::Duplicate(format!("order {}", order.id())));
        }
        map.insert(order.id(), order.clone());
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let map = self.orders.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(&id).cloned())
    }

    async fn list_by_customer(&self, customer_id: UserId) -> Result<Vec<Order>, StoreError> {
        self.collect_sorted(|o| o.is_owned_by(customer_id))
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        self.collect_sorted(|_| true)
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Order>, StoreError> {
        let mut map = self.orders.write().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get_mut(&id).map(|order| {
            order.set_status(status, at);
            order.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_catalog::{ProductId, StockDebit};
    use storefront_core::Money;
    use storefront_orders::{PaymentMethod, ShippingAddress};

    fn order_for(customer: UserId, created_at: DateTime<Utc>) -> Order {
        let debit = StockDebit {
            product_id: ProductId::generate(),
            name: "Widget".to_string(),
            unit_price: Money::from_cents(1000),
            quantity: 1,
            remaining: 0,
        };
        Order::assemble(
            OrderId::generate(),
            customer,
            &[debit],
            ShippingAddress {
                address: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                postal_code: "12345".to_string(),
                country: "US".to_string(),
            },
            PaymentMethod::new("PayPal").unwrap(),
            created_at,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let ledger = InMemoryOrderLedger::new();
        let order = order_for(UserId::new(), Utc::now());

        ledger.insert(&order).await.unwrap();
        assert!(matches!(
            ledger.insert(&order).await,
            Err(StoreError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn listings_are_filtered_and_newest_first() {
        let ledger = InMemoryOrderLedger::new();
        let alice = UserId::new();
        let bob = UserId::new();
        let t0 = Utc::now();

        let a_old = order_for(alice, t0);
        let a_new = order_for(alice, t0 + chrono::Duration::seconds(10));
        let b = order_for(bob, t0 + chrono::Duration::seconds(5));
        for o in [&a_old, &b, &a_new] {
            ledger.insert(o).await.unwrap();
        }

        let mine: Vec<_> = ledger
            .list_by_customer(alice)
            .await
            .unwrap()
            .iter()
            .map(Order::id)
            .collect();
        assert_eq!(mine, vec![a_new.id(), a_old.id()]);

        let all: Vec<_> = ledger.list_all().await.unwrap().iter().map(Order::id).collect();
        assert_eq!(all, vec![a_new.id(), b.id(), a_old.id()]);

        assert!(ledger.list_by_customer(UserId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_status_touches_only_status() {
        let ledger = InMemoryOrderLedger::new();
        let order = order_for(UserId::new(), Utc::now());
        ledger.insert(&order).await.unwrap();

        let at = order.created_at() + chrono::Duration::seconds(1);
        let updated = ledger
            .update_status(order.id(), OrderStatus::Shipped, at)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status(), OrderStatus::Shipped);
        assert_eq!(updated.updated_at(), at);
        assert_eq!(updated.total_price(), order.total_price());
        assert_eq!(updated.line_items(), order.line_items());

        assert!(ledger
            .update_status(OrderId::generate(), OrderStatus::Shipped, at)
            .await
            .unwrap()
            .is_none());
    }
}
