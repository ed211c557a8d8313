//! Reconciliation report models

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::OrderStatus;
use crate::types::DateRange;

/// Where recognized revenue comes from
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// Net receipt of reconciled orders; expenses from the finance ledger
    #[default]
    OrderBased,
    /// Income and expense entries of the finance ledger only
    LedgerOnly,
}

impl ReportMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "order_based" | "orders" => Some(ReportMode::OrderBased),
            "ledger_only" | "ledger" => Some(ReportMode::LedgerOnly),
            _ => None,
        }
    }
}

/// Operational order counts, never summed into revenue
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderCounts {
    /// Orders created within the range
    pub total: usize,
    /// Orders currently with the courier
    pub in_transit: usize,
    pub reconciled: usize,
    pub by_status: BTreeMap<OrderStatus, usize>,
}

/// One point of the daily chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyPoint {
    pub day: NaiveDate,
    pub revenue: Decimal,
    pub expense: Decimal,
    pub profit: Decimal,
}

/// Revenue / expense / profit over a date range
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSummary {
    pub mode: ReportMode,
    pub range: DateRange,
    pub revenue: Decimal,
    pub expense: Decimal,
    pub profit: Decimal,
    pub orders: OrderCounts,
    pub daily: Vec<DailyPoint>,
}
