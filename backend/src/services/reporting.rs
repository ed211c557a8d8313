//! Reconciliation report: revenue, expense and profit over a date range
//!
//! Pure read over orders and finance transactions; nothing is mutated.

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    local_day, shop_offset, DailyPoint, DateRange, Order, OrderCounts, OrderStatus, ReportMode,
    ReportSummary, Transaction, DEFAULT_UTC_OFFSET_HOURS,
};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub mode: ReportMode,
    /// Shop-local clock; decides which calendar day an order belongs to
    pub offset: FixedOffset,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            mode: ReportMode::default(),
            offset: shop_offset(DEFAULT_UTC_OFFSET_HOURS).unwrap_or_else(|| Utc.fix()),
        }
    }
}

#[derive(Debug, Default)]
struct DayTotals {
    revenue: Decimal,
    expense: Decimal,
}

pub struct ReconciliationReport;

impl ReconciliationReport {
    pub fn build(
        orders: &[Order],
        transactions: &[Transaction],
        range: DateRange,
        options: ReportOptions,
    ) -> ReportSummary {
        let mut days: BTreeMap<NaiveDate, DayTotals> =
            range.days().map(|day| (day, DayTotals::default())).collect();

        let in_range: Vec<&Order> = orders
            .iter()
            .filter(|o| range.contains_instant(o.created_at, options.offset))
            .collect();

        let ledger_entries = transactions.iter().filter(|t| range.contains_date(t.date));
        for tx in ledger_entries {
            let Some(totals) = days.get_mut(&tx.date) else {
                continue;
            };
            if tx.is_expense() {
                totals.expense += tx.amount;
            } else if options.mode == ReportMode::LedgerOnly {
                totals.revenue += tx.amount;
            }
        }

        if options.mode == ReportMode::OrderBased {
            for order in in_range.iter().filter(|o| o.status.recognizes_revenue()) {
                let day = local_day(order.created_at, options.offset);
                if let Some(totals) = days.get_mut(&day) {
                    totals.revenue += order.net_received();
                }
            }
        }

        let daily: Vec<DailyPoint> = days
            .into_iter()
            .map(|(day, totals)| DailyPoint {
                day,
                revenue: totals.revenue,
                expense: totals.expense,
                profit: totals.revenue - totals.expense,
            })
            .collect();

        let revenue: Decimal = daily.iter().map(|p| p.revenue).sum();
        let expense: Decimal = daily.iter().map(|p| p.expense).sum();

        let summary = ReportSummary {
            mode: options.mode,
            range,
            revenue,
            expense,
            profit: revenue - expense,
            orders: order_counts(&in_range),
            daily,
        };

        tracing::debug!(
            mode = ?summary.mode,
            start = %range.start(),
            end = %range.end(),
            revenue = %summary.revenue,
            expense = %summary.expense,
            "report built"
        );
        summary
    }

    /// Render rows as CSV with a header line
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("UTF-8 conversion error: {}", e)))
    }
}

fn order_counts(orders: &[&Order]) -> OrderCounts {
    let mut by_status: BTreeMap<OrderStatus, usize> =
        OrderStatus::ALL.into_iter().map(|s| (s, 0)).collect();
    for order in orders {
        *by_status.entry(order.status).or_default() += 1;
    }

    OrderCounts {
        total: orders.len(),
        in_transit: by_status.get(&OrderStatus::Shipping).copied().unwrap_or(0),
        reconciled: by_status.get(&OrderStatus::Reconciliation).copied().unwrap_or(0),
        by_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared::{
        Customer, MaterialsMode, OrderContent, OrderItem, PaymentMethod, ShippingPayer,
        TransactionCategory, TransactionKind,
    };
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn order(status: OrderStatus, created: chrono::DateTime<Utc>) -> Order {
        Order::new(
            Uuid::new_v4(),
            created,
            OrderContent {
                order_code: "DH001".to_string(),
                tracking_number: "HFL12345678".to_string(),
                customer: Customer::default(),
                items: vec![OrderItem {
                    product_id: None,
                    product_name: "Red Passion".to_string(),
                    price: Decimal::from(500_000),
                    quantity: 1,
                    recipe: Vec::new(),
                }],
                used_materials: Vec::new(),
                materials_mode: MaterialsMode::Manual,
                status,
                shipping_fee: Decimal::from(30_000),
                shipping_payer: ShippingPayer::Shop,
                payment_method: PaymentMethod::Cod,
                delivery_unit: None,
                delivery_code: None,
                notes: None,
            },
        )
        .unwrap()
    }

    fn transaction(date: NaiveDate, amount: i64, kind: TransactionKind) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            date,
            amount: Decimal::from(amount),
            kind,
            category: TransactionCategory::Other,
            description: String::new(),
            related_materials: None,
        }
    }

    #[test]
    fn test_only_reconciled_orders_count_as_revenue() {
        let at = Utc.with_ymd_and_hms(2024, 5, 20, 3, 0, 0).unwrap();
        let orders = vec![
            order(OrderStatus::Reconciliation, at),
            order(OrderStatus::Delivered, at),
        ];
        let range = DateRange::single_day(day(20)).unwrap();

        let summary = ReconciliationReport::build(&orders, &[], range, ReportOptions::default());

        assert_eq!(summary.revenue, Decimal::from(470_000));
        assert_eq!(summary.orders.total, 2);
        assert_eq!(summary.orders.reconciled, 1);
    }

    #[test]
    fn test_ledger_only_ignores_orders_for_revenue() {
        let at = Utc.with_ymd_and_hms(2024, 5, 20, 3, 0, 0).unwrap();
        let orders = vec![order(OrderStatus::Reconciliation, at), order(OrderStatus::Shipping, at)];
        let transactions = vec![
            transaction(day(20), 2_000_000, TransactionKind::Income),
            transaction(day(21), 300_000, TransactionKind::Expense),
        ];
        let options = ReportOptions {
            mode: ReportMode::LedgerOnly,
            ..Default::default()
        };
        let range = DateRange::new(day(20), day(21)).unwrap();

        let summary = ReconciliationReport::build(&orders, &transactions, range, options);

        assert_eq!(summary.revenue, Decimal::from(2_000_000));
        assert_eq!(summary.expense, Decimal::from(300_000));
        assert_eq!(summary.profit, Decimal::from(1_700_000));
        assert_eq!(summary.orders.in_transit, 1);
    }

    #[test]
    fn test_late_evening_order_lands_on_end_day() {
        // 23:30 shop time on the 21st
        let at = Utc.with_ymd_and_hms(2024, 5, 21, 16, 30, 0).unwrap();
        let orders = vec![order(OrderStatus::Reconciliation, at)];
        let range = DateRange::new(day(20), day(21)).unwrap();

        let summary = ReconciliationReport::build(&orders, &[], range, ReportOptions::default());

        assert_eq!(summary.revenue, Decimal::from(470_000));
        assert_eq!(summary.daily.len(), 2);
        assert_eq!(summary.daily[1].revenue, Decimal::from(470_000));
    }

    #[test]
    fn test_daily_series_covers_every_day() {
        let transactions = vec![transaction(day(22), 100_000, TransactionKind::Expense)];
        let range = DateRange::new(day(20), day(23)).unwrap();

        let summary =
            ReconciliationReport::build(&[], &transactions, range, ReportOptions::default());

        let days: Vec<NaiveDate> = summary.daily.iter().map(|p| p.day).collect();
        assert_eq!(days, vec![day(20), day(21), day(22), day(23)]);
        assert_eq!(summary.daily[2].profit, Decimal::from(-100_000));
        assert_eq!(summary.profit, Decimal::from(-100_000));
    }

    #[test]
    fn test_report_at_calendar_edge() {
        let last = NaiveDate::MAX.pred_opt().unwrap();
        let at = Utc.from_utc_datetime(&last.and_hms_opt(3, 0, 0).unwrap());
        let orders = vec![order(OrderStatus::Reconciliation, at)];

        assert!(DateRange::single_day(NaiveDate::MAX).is_err());
        let range = DateRange::single_day(last).unwrap();
        let summary = ReconciliationReport::build(&orders, &[], range, ReportOptions::default());

        assert_eq!(summary.revenue, Decimal::from(470_000));
        assert_eq!(summary.daily.len(), 1);
    }

    #[test]
    fn test_export_daily_series_to_csv() {
        let range = DateRange::single_day(day(20)).unwrap();
        let summary = ReconciliationReport::build(&[], &[], range, ReportOptions::default());

        let csv = ReconciliationReport::export_to_csv(&summary.daily).unwrap();

        assert!(csv.starts_with("day,revenue,expense,profit\n"));
        assert!(csv.contains("2024-05-20,0,0,0"));
    }
}
