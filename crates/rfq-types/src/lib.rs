//! Shared domain types for the RFQ engine.
//!
//! This crate defines the vocabulary every other crate speaks: normalized
//! token addresses, ordered pairs, price-level ladders, firm quotes, signed
//! orders and pool identifiers. It contains no I/O.

pub mod address;
pub mod levels;
pub mod metadata;
pub mod order;
pub mod pair;
pub mod pool;
pub mod quote;
pub mod side;
pub mod trade;

pub use address::*;
pub use levels::*;
pub use metadata::*;
pub use order::*;
pub use pair::*;
pub use pool::*;
pub use quote::*;
pub use side::*;
pub use trade::*;
