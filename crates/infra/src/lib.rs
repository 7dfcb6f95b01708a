//! Infrastructure layer: stores, reservation, and the order service.
//!
//! Every store comes in an in-memory flavour (tests, local dev) and a
//! Postgres flavour (sqlx). The service is generic over both traits.

pub mod catalog_store;
pub mod error;
pub mod order_ledger;
pub mod postgres;
pub mod reservation;
pub mod seed;
pub mod service;

mod postgres_tests;

pub use catalog_store::{CatalogStore, DebitOutcome, InMemoryCatalogStore, PostgresCatalogStore};
pub use error::{OrderError, StoreError};
pub use order_ledger::{InMemoryOrderLedger, OrderLedger, PostgresOrderLedger};
pub use reservation::InventoryReservation;
pub use seed::{SeedError, load_seed_file, parse_seed, seed_catalog};
pub use service::OrderService;
