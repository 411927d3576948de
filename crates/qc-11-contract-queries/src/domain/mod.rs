//! # Domain Layer (Inner Hexagon)
//!
//! Pure bookkeeping for contract queries: gas accounting, execution context
//! and reentrancy tracking, the query model and its metadata records.
//! NO I/O, NO async.

pub mod context;
pub mod entities;
pub mod gas;
pub mod query;
pub mod services;
pub mod value_objects;

pub use context::*;
pub use entities::*;
pub use gas::*;
pub use query::*;
pub use services::*;
pub use value_objects::*;
