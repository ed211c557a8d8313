//! Shop Ledger - order, inventory and finance reconciliation for a small
//! flower shop
//!
//! Orders take their raw materials out of stock once dispatched, purchases
//! put them back, and the reconciliation report turns reconciled orders and
//! ledger entries into revenue, expense and profit.

pub mod config;
pub mod error;
pub mod seed;
pub mod services;
pub mod session;
pub mod store;

pub use crate::config::Config;
pub use crate::error::{AppError, AppResult};
pub use crate::session::{SessionOptions, ShopSession, ShopState};
