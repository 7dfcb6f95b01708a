//! Postgres-backed store tests.
//!
//! Ignored by default; run with `DATABASE_URL` set and `--ignored`.
//! Every test works on freshly generated product and order ids, so they can
//! share one database.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sqlx::PgPool;

    use storefront_auth::Principal;
    use storefront_catalog::{Product, ProductId};
    use storefront_core::{Money, UserId};
    use storefront_orders::{LineRequest, OrderStatus, PaymentMethod, PlaceOrder, ShippingAddress};

    use crate::catalog_store::{CatalogStore, DebitOutcome, PostgresCatalogStore};
    use crate::error::{OrderError, StoreError};
    use crate::order_ledger::{OrderLedger, PostgresOrderLedger};
    use crate::postgres::{connect, migrate};
    use crate::service::OrderService;

    type Service = OrderService<PostgresCatalogStore, PostgresOrderLedger>;

    async fn pool() -> Option<PgPool> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = connect(&url, 16).await.expect("failed to connect");
        migrate(&pool).await.expect("failed to migrate");
        Some(pool)
    }

    fn request(lines: &[(ProductId, u32)]) -> PlaceOrder {
        PlaceOrder::new(
            lines
                .iter()
                .map(|(product_id, quantity)| LineRequest {
                    product_id: *product_id,
                    quantity: *quantity,
                })
                .collect(),
            ShippingAddress {
                address: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                postal_code: "12345".to_string(),
                country: "US".to_string(),
            },
            PaymentMethod::new("Card").unwrap(),
        )
        .unwrap()
    }

    async fn service_with(pool: &PgPool, products: Vec<Product>) -> Service {
        let catalog = PostgresCatalogStore::new(pool.clone());
        for product in products {
            catalog.upsert(product).await.unwrap();
        }
        OrderService::new(catalog, PostgresOrderLedger::new(pool.clone()))
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn debit_reports_outcome_in_one_statement() {
        let Some(pool) = pool().await else { return };
        let catalog = PostgresCatalogStore::new(pool);
        let product = Product::new(ProductId::generate(), "Widget", Money::from_cents(1000), 5).unwrap();
        let pid = product.id();
        catalog.upsert(product).await.unwrap();

        match catalog.debit_stock(pid, 3).await.unwrap() {
            DebitOutcome::Debited(debit) => {
                assert_eq!(debit.remaining, 2);
                assert_eq!(debit.unit_price, Money::from_cents(1000));
                assert_eq!(debit.name, "Widget");
            }
            other => panic!("expected debit, got {other:?}"),
        }

        assert!(matches!(
            catalog.debit_stock(pid, 3).await.unwrap(),
            DebitOutcome::InsufficientStock {
                requested: 3,
                available: 2
            }
        ));
        assert!(matches!(
            catalog.debit_stock(ProductId::generate(), 1).await.unwrap(),
            DebitOutcome::NotFound
        ));

        assert_eq!(catalog.credit_stock(pid, 3).await.unwrap(), 5);
        let stored = catalog.get(pid).await.unwrap().unwrap();
        assert_eq!(stored.stock(), 5);
        assert!(matches!(
            catalog.credit_stock(ProductId::generate(), 1).await,
            Err(StoreError::Missing(_))
        ));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn ledger_round_trips_orders_and_statuses() {
        let Some(pool) = pool().await else { return };
        let product = Product::new(ProductId::generate(), "Lamp", Money::from_cents(2599), 10).unwrap();
        let pid = product.id();
        let svc = service_with(&pool, vec![product]).await;
        let customer = Principal::customer(UserId::new());
        let admin = Principal::admin(UserId::new());

        let first = svc.place_order(&customer, request(&[(pid, 2)])).await.unwrap();
        let second = svc.place_order(&customer, request(&[(pid, 1), (pid, 1)])).await.unwrap();

        let loaded = svc.get_order(&customer, first.id()).await.unwrap();
        assert_eq!(loaded.line_items(), first.line_items());
        assert_eq!(loaded.total_price(), Money::from_cents(5198));
        assert_eq!(loaded.shipping_address(), first.shipping_address());

        let mine = svc.list_my_orders(&customer).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id(), second.id());
        assert_eq!(mine[1].id(), first.id());

        let shipped = svc.update_status(&admin, first.id(), "Shipped").await.unwrap();
        assert_eq!(shipped.status(), OrderStatus::Shipped);
        assert_eq!(shipped.total_price(), first.total_price());
        assert!(matches!(
            svc.ledger().insert(&first).await,
            Err(StoreError::Duplicate(_))
        ));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn unstorable_total_is_a_validation_error_and_releases_stock() {
        let Some(pool) = pool().await else { return };
        let price = Money::from_cents(i64::MAX as u64 / 2);
        let product = Product::new(ProductId::generate(), "Yacht", price, 5).unwrap();
        let pid = product.id();
        let svc = service_with(&pool, vec![product]).await;
        let customer = Principal::customer(UserId::new());

        let err = svc.place_order(&customer, request(&[(pid, 3)])).await.unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
        assert_eq!(svc.catalog().get(pid).await.unwrap().unwrap().stock(), 5);
        assert!(svc.list_my_orders(&customer).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    #[ignore = "requires DATABASE_URL"]
    async fn concurrent_placements_never_oversell() {
        let Some(pool) = pool().await else { return };
        let (stock, quantity, requests) = (20u32, 3u32, 32usize);
        let product = Product::new(ProductId::generate(), "Hot item", Money::from_cents(250), stock).unwrap();
        let pid = product.id();
        let svc = Arc::new(service_with(&pool, vec![product]).await);
        let customer = Principal::customer(UserId::new());

        let mut handles = Vec::with_capacity(requests);
        for _ in 0..requests {
            let svc = svc.clone();
            let customer = customer.clone();
            handles.push(tokio::spawn(async move {
                svc.place_order(&customer, request(&[(pid, quantity)])).await
            }));
        }

        let mut succeeded = 0u32;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(OrderError::InsufficientStock { available, requested, .. }) => {
                    assert!(available < requested);
                }
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(succeeded, stock / quantity);
        let remaining = svc.catalog().get(pid).await.unwrap().unwrap().stock();
        assert_eq!(remaining, stock - succeeded * quantity);
        assert_eq!(svc.list_my_orders(&customer).await.unwrap().len(), succeeded as usize);
    }
}
