//! Shop session tests
//!
//! Tests for persistence through the durable store including:
//! - Seeding the starter data at most once per account
//! - Orders and inventory written together, rolled back together
//! - File store round trip across sessions
//! - Purchases restocking through the finance ledger

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shop_ledger::seed::{BABY_BREATH, RED_PASSION, RED_ROSE};
use shop_ledger::services::{ReportOptions, RestockPolicy};
use shop_ledger::store::{Collection, DurableStore, FileStore, MemoryStore};
use shop_ledger::{AppError, AppResult, SessionOptions, ShopSession};
use shared::{
    Customer, InventoryItemUpdate, NewTransaction, Order, OrderDraft, TransactionCategory,
    TransactionKind, UsedMaterial,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Memory store whose writes can be made to fail
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    fn fail_writes(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }
}

impl DurableStore for FlakyStore {
    fn load(&self, account_id: &str, collection: Collection) -> AppResult<Option<Vec<u8>>> {
        self.inner.load(account_id, collection)
    }

    fn save(&self, account_id: &str, collection: Collection, bytes: &[u8]) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Storage("disk full".to_string()));
        }
        self.inner.save(account_id, collection, bytes)
    }
}

fn open(store: Arc<dyn DurableStore>) -> ShopSession {
    ShopSession::open(store, "happy-flower", SessionOptions::default()).unwrap()
}

fn order_draft(session: &ShopSession, quantity: u32, delivery_code: Option<&str>) -> OrderDraft {
    OrderDraft {
        customer: Customer {
            name: "Lê Văn Cường".to_string(),
            phone: "0987654321".to_string(),
            address: "789 Võ Văn Kiệt, Q.5, TP.HCM".to_string(),
            email: "cuong.le@example.com".to_string(),
        },
        items: vec![session.select_product(RED_PASSION, quantity).unwrap()],
        shipping_fee: dec("30000"),
        delivery_code: delivery_code.map(str::to_string),
        ..Default::default()
    }
}

fn rose_purchase(quantity: u32) -> NewTransaction {
    NewTransaction {
        date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
        amount: dec("1500000"),
        kind: TransactionKind::Expense,
        category: TransactionCategory::MaterialPurchase,
        description: "Nhập hoa hồng Đà Lạt".to_string(),
        related_materials: Some(vec![UsedMaterial::new(RED_ROSE, "", "", quantity)]),
    }
}

// ============================================================================
// Seeding
// ============================================================================

#[test]
fn test_new_account_is_seeded_and_saved() {
    let store = Arc::new(MemoryStore::new());
    let session = open(store.clone());

    assert_eq!(session.inventory().list().len(), 6);
    assert_eq!(session.catalog().list().len(), 3);
    assert!(session.orders().list().is_empty());
    assert!(session.finance().list().is_empty());

    assert!(store.contains("happy-flower", Collection::Inventory));
    assert!(store.contains("happy-flower", Collection::Products));
}

#[test]
fn test_seeding_happens_once() {
    let store = Arc::new(MemoryStore::new());
    let mut session = open(store.clone());
    session.delete_inventory_item(BABY_BREATH).unwrap();
    session
        .update_inventory_item(
            RED_ROSE,
            InventoryItemUpdate {
                quantity: Some(7),
                ..Default::default()
            },
        )
        .unwrap();

    let reopened = open(store);

    assert_eq!(reopened.inventory().list().len(), 5);
    assert!(reopened.inventory().find(BABY_BREATH).is_none());
    assert_eq!(reopened.inventory().quantity_of(RED_ROSE), Some(7));
}

#[test]
fn test_accounts_are_seeded_independently() {
    let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
    let mut first = ShopSession::open(store.clone(), "shop-a", SessionOptions::default()).unwrap();
    first.delete_product(RED_PASSION).unwrap();

    let second = ShopSession::open(store, "shop-b", SessionOptions::default()).unwrap();

    assert_eq!(second.catalog().list().len(), 3);
}

// ============================================================================
// Atomic writes
// ============================================================================

#[test]
fn test_failed_write_rolls_back_order_and_stock() {
    let store = Arc::new(FlakyStore::default());
    let mut session = open(store.clone());
    let draft = order_draft(&session, 1, Some("GHN827361"));

    store.fail_writes(true);
    let err = session.create_order(draft).unwrap_err();

    assert!(matches!(err, AppError::Storage(_)));
    assert!(session.orders().list().is_empty());
    assert_eq!(session.inventory().quantity_of(RED_ROSE), Some(150));

    store.fail_writes(false);
    let reopened = open(store);
    assert!(reopened.orders().list().is_empty());
    assert_eq!(reopened.inventory().quantity_of(RED_ROSE), Some(150));
}

#[test]
fn test_failed_delete_keeps_order_and_stock() {
    let store = Arc::new(FlakyStore::default());
    let mut session = open(store.clone());
    let order = session.create_order(order_draft(&session, 1, Some("GHN1"))).unwrap();
    assert_eq!(session.inventory().quantity_of(RED_ROSE), Some(138));

    store.fail_writes(true);
    assert!(session.delete_order(order.id).is_err());

    assert!(session.orders().get(order.id).is_ok());
    assert_eq!(session.inventory().quantity_of(RED_ROSE), Some(138));
}

#[test]
fn test_validation_error_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let mut session = open(store.clone());
    let mut draft = order_draft(&session, 1, Some("GHN2"));
    draft.customer.phone.clear();

    assert!(session.create_order(draft).unwrap_err().is_validation());
    assert!(!store.contains("happy-flower", Collection::Orders));
}

// ============================================================================
// File store round trip
// ============================================================================

#[test]
fn test_orders_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn DurableStore> = Arc::new(FileStore::new(dir.path()));

    let order = {
        let mut session = open(store.clone());
        session.create_order(order_draft(&session, 2, Some("GHN3"))).unwrap()
    };

    let mut session = open(store.clone());
    let loaded = session.orders().get(order.id).unwrap().clone();
    assert_eq!(loaded, order);
    assert_eq!(loaded.total_amount(), dec("1000000"));
    assert_eq!(session.inventory().quantity_of(RED_ROSE), Some(126));

    // The persisted deduction snapshot still drives the restore
    session.delete_order(order.id).unwrap();
    let session = open(store);
    assert_eq!(session.inventory().quantity_of(RED_ROSE), Some(150));
}

#[test]
fn test_drifted_total_is_recomputed_on_open() {
    let store = Arc::new(MemoryStore::new());
    let order = {
        let mut session = open(store.clone());
        session.create_order(order_draft(&session, 1, None)).unwrap()
    };

    let bytes = store.load("happy-flower", Collection::Orders).unwrap().unwrap();
    let mut orders: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    orders[0]["total_amount"] = serde_json::json!("1");
    store
        .save("happy-flower", Collection::Orders, &serde_json::to_vec(&orders).unwrap())
        .unwrap();

    let session = open(store);
    let loaded: &Order = session.orders().get(order.id).unwrap();
    assert_eq!(loaded.total_amount(), dec("500000"));
}

#[test]
fn test_out_of_range_stored_order_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    {
        let mut session = open(store.clone());
        session.create_order(order_draft(&session, 2, None)).unwrap();
    }

    let bytes = store.load("happy-flower", Collection::Orders).unwrap().unwrap();
    let mut orders: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    orders[0]["items"][0]["price"] = serde_json::json!(Decimal::MAX.to_string());
    store
        .save("happy-flower", Collection::Orders, &serde_json::to_vec(&orders).unwrap())
        .unwrap();

    let err = ShopSession::open(store, "happy-flower", SessionOptions::default()).err();
    assert!(err.is_some_and(|e| e.is_validation()));
}

// ============================================================================
// Finance
// ============================================================================

#[test]
fn test_purchase_restock_is_persisted() {
    let store = Arc::new(MemoryStore::new());
    let mut session = open(store.clone());

    let tx = session.add_transaction(rose_purchase(50)).unwrap();
    assert_eq!(tx.restock_lines()[0].name, "Hoa Hồng Đỏ Đà Lạt");

    let mut reopened = open(store.clone());
    assert_eq!(reopened.inventory().quantity_of(RED_ROSE), Some(200));
    assert_eq!(reopened.finance().total_expenses(), dec("1500000"));

    // Restocks are final by default
    reopened.delete_transaction(tx.id).unwrap();
    let reopened = open(store);
    assert_eq!(reopened.inventory().quantity_of(RED_ROSE), Some(200));
    assert!(reopened.finance().list().is_empty());
}

#[test]
fn test_reversible_restock_policy() {
    let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
    let options = SessionOptions {
        restock_policy: RestockPolicy::Reversible,
        report: ReportOptions::default(),
    };
    let mut session = ShopSession::open(store, "happy-flower", options).unwrap();

    let tx = session.add_transaction(rose_purchase(50)).unwrap();
    session.delete_transaction(tx.id).unwrap();

    assert_eq!(session.inventory().quantity_of(RED_ROSE), Some(150));
}

#[test]
fn test_unknown_ids_are_not_found() {
    let store = Arc::new(MemoryStore::new());
    let mut session = open(store);
    let missing = uuid::Uuid::new_v4();

    assert!(session.delete_order(missing).unwrap_err().is_not_found());
    assert!(session.delete_transaction(missing).unwrap_err().is_not_found());
    assert!(session.delete_product(missing).unwrap_err().is_not_found());
    assert!(session.select_product(missing, 1).unwrap_err().is_not_found());
}
