//! Business logic services for the shop ledger

pub mod catalog;
pub mod consumption;
pub mod finance;
pub mod inventory;
pub mod orders;
pub mod reporting;

pub use catalog::ProductCatalog;
pub use consumption::MaterialConsumptionEngine;
pub use finance::{restock_reversal, FinanceLedger, RestockPolicy};
pub use inventory::InventoryLedger;
pub use orders::OrderStore;
pub use reporting::{ReconciliationReport, ReportOptions};
