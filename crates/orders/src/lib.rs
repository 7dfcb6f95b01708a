//! Orders domain module.
//!
//! Order records, the placement request shape, the price/line-item snapshot
//! built at placement time, and the status lifecycle. Pure domain logic only
//! (no IO, no HTTP, no storage).

pub mod order;
pub mod request;
pub mod status;

pub use order::{LineItem, Order, OrderId};
pub use request::{LineRequest, PaymentMethod, PlaceOrder, ShippingAddress};
pub use status::{InvalidStatus, OrderStatus};
