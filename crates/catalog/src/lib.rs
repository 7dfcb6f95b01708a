//! Catalog domain module.
//!
//! Only the parts of a product this system touches live here: identity, name,
//! price and the single stock counter. Browsing and catalog editing are handled
//! elsewhere.

pub mod product;

pub use product::{Product, ProductId, StockDebit, StockError};
