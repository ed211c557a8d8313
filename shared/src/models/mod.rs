//! Domain models for the shop ledger

mod finance;
mod inventory;
mod order;
mod product;
mod report;

pub use finance::*;
pub use inventory::*;
pub use order::*;
pub use product::*;
pub use report::*;
