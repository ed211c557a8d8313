//! Per-account session: the four stores of one shop, backed by a durable store
//!
//! Every mutation runs against the in-memory stores first and is then written
//! out in one batch. If the write fails the stores are put back as they were,
//! so an order is never saved without its inventory movement or the reverse.

use std::sync::Arc;

use chrono::Utc;
use shared::{
    BulkOrderRow, DateRange, InventoryItem, InventoryItemUpdate, NewInventoryItem, NewTransaction,
    Order, OrderDraft, OrderItemDraft, OrderStatus, Product, ProductInput, ReportMode,
    ReportSummary, Transaction,
};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppResult;
use crate::seed;
use crate::services::{
    FinanceLedger, InventoryLedger, OrderStore, ProductCatalog, ReconciliationReport, ReportOptions,
    RestockPolicy,
};
use crate::store::{encode_json, load_json, Collection, DurableStore};

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub restock_policy: RestockPolicy,
    pub report: ReportOptions,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self {
            restock_policy: config.finance.restock_policy,
            report: ReportOptions {
                mode: config.report.mode,
                offset: config.shop_offset()?,
            },
        })
    }
}

/// Everything one account owns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShopState {
    pub orders: OrderStore,
    pub inventory: InventoryLedger,
    pub catalog: ProductCatalog,
    pub finance: FinanceLedger,
}

pub struct ShopSession {
    store: Arc<dyn DurableStore>,
    account_id: String,
    options: SessionOptions,
    state: ShopState,
}

impl ShopSession {
    /// Load an account, seeding the starter inventory and catalog the first
    /// time either collection is missing
    pub fn open(
        store: Arc<dyn DurableStore>,
        account_id: impl Into<String>,
        options: SessionOptions,
    ) -> AppResult<Self> {
        let account_id = account_id.into();
        let mut seeded = Vec::new();

        let stored_inventory: Option<Vec<InventoryItem>> =
            load_json(store.as_ref(), &account_id, Collection::Inventory)?;
        let inventory = match stored_inventory {
            Some(items) => items,
            None => {
                seeded.push(Collection::Inventory);
                seed::starter_inventory(Utc::now())
            }
        };
        let stored_products: Option<Vec<Product>> =
            load_json(store.as_ref(), &account_id, Collection::Products)?;
        let products = match stored_products {
            Some(products) => products,
            None => {
                seeded.push(Collection::Products);
                seed::starter_products()
            }
        };
        let orders: Vec<Order> =
            load_json(store.as_ref(), &account_id, Collection::Orders)?.unwrap_or_default();
        let transactions: Vec<Transaction> =
            load_json(store.as_ref(), &account_id, Collection::FinanceTransactions)?
                .unwrap_or_default();

        let session = Self {
            store,
            account_id,
            options,
            state: ShopState {
                orders: OrderStore::from_orders(orders)?,
                inventory: InventoryLedger::from_items(inventory),
                catalog: ProductCatalog::from_products(products),
                finance: FinanceLedger::from_transactions(transactions)
                    .with_policy(options.restock_policy),
            },
        };

        if !seeded.is_empty() {
            session.persist(&seeded)?;
            tracing::info!(
                account_id = %session.account_id,
                collections = ?seeded,
                "starter data seeded"
            );
        }
        tracing::debug!(
            account_id = %session.account_id,
            orders = session.state.orders.list().len(),
            "session opened"
        );
        Ok(session)
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn state(&self) -> &ShopState {
        &self.state
    }

    pub fn orders(&self) -> &OrderStore {
        &self.state.orders
    }

    pub fn inventory(&self) -> &InventoryLedger {
        &self.state.inventory
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.state.catalog
    }

    pub fn finance(&self) -> &FinanceLedger {
        &self.state.finance
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    pub fn create_order(&mut self, draft: OrderDraft) -> AppResult<Order> {
        self.commit(&[Collection::Orders, Collection::Inventory], |s| {
            s.orders.create(draft, &s.catalog, &mut s.inventory)
        })
    }

    pub fn update_order(&mut self, id: Uuid, draft: OrderDraft) -> AppResult<Order> {
        self.commit(&[Collection::Orders, Collection::Inventory], |s| {
            s.orders.update(id, draft, &s.catalog, &mut s.inventory)
        })
    }

    pub fn delete_order(&mut self, id: Uuid) -> AppResult<Order> {
        self.commit(&[Collection::Orders, Collection::Inventory], |s| {
            s.orders.delete(id, &mut s.inventory)
        })
    }

    pub fn set_order_status(&mut self, id: Uuid, status: OrderStatus) -> AppResult<Order> {
        self.commit(&[Collection::Orders], |s| s.orders.set_status(id, status))
    }

    pub fn dispatch_order(&mut self, id: Uuid, carrier: &str) -> AppResult<Order> {
        self.commit(&[Collection::Orders, Collection::Inventory], |s| {
            s.orders.dispatch(id, carrier, &mut s.inventory)
        })
    }

    pub fn import_orders(&mut self, rows: Vec<BulkOrderRow>) -> AppResult<Vec<Order>> {
        self.commit(&[Collection::Orders], |s| s.orders.import_rows(rows))
    }

    /// Order line for a catalog product; see [`ProductCatalog::select`]
    pub fn select_product(&self, id: Uuid, quantity: u32) -> AppResult<OrderItemDraft> {
        self.state.catalog.select(id, quantity)
    }

    // ------------------------------------------------------------------
    // Inventory
    // ------------------------------------------------------------------

    pub fn add_inventory_item(&mut self, input: NewInventoryItem) -> AppResult<InventoryItem> {
        self.commit(&[Collection::Inventory], |s| s.inventory.add_item(input))
    }

    pub fn update_inventory_item(
        &mut self,
        id: Uuid,
        update: InventoryItemUpdate,
    ) -> AppResult<InventoryItem> {
        self.commit(&[Collection::Inventory], |s| s.inventory.update_item(id, update))
    }

    pub fn delete_inventory_item(&mut self, id: Uuid) -> AppResult<InventoryItem> {
        self.commit(&[Collection::Inventory], |s| s.inventory.delete_item(id))
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    pub fn add_product(&mut self, input: ProductInput) -> AppResult<Product> {
        self.commit(&[Collection::Products], |s| s.catalog.add(input))
    }

    pub fn update_product(&mut self, id: Uuid, input: ProductInput) -> AppResult<Product> {
        self.commit(&[Collection::Products], |s| s.catalog.update(id, input))
    }

    pub fn delete_product(&mut self, id: Uuid) -> AppResult<Product> {
        self.commit(&[Collection::Products], |s| s.catalog.delete(id))
    }

    // ------------------------------------------------------------------
    // Finance
    // ------------------------------------------------------------------

    pub fn add_transaction(&mut self, input: NewTransaction) -> AppResult<Transaction> {
        self.commit(&[Collection::FinanceTransactions, Collection::Inventory], |s| {
            s.finance.add_transaction(input, &mut s.inventory)
        })
    }

    pub fn delete_transaction(&mut self, id: Uuid) -> AppResult<Transaction> {
        self.commit(&[Collection::FinanceTransactions, Collection::Inventory], |s| {
            s.finance.delete(id, &mut s.inventory)
        })
    }

    // ------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------

    /// Report over `range`, in `mode` or the session's default mode
    pub fn report(&self, range: DateRange, mode: Option<ReportMode>) -> ReportSummary {
        let options = ReportOptions {
            mode: mode.unwrap_or(self.options.report.mode),
            ..self.options.report
        };
        ReconciliationReport::build(
            self.state.orders.list(),
            self.state.finance.list(),
            range,
            options,
        )
    }

    /// Apply `op` and persist the touched collections, restoring the previous
    /// state if either step fails
    fn commit<T>(
        &mut self,
        touched: &[Collection],
        op: impl FnOnce(&mut ShopState) -> AppResult<T>,
    ) -> AppResult<T> {
        let before = self.state.clone();

        let value = match op(&mut self.state) {
            Ok(value) => value,
            Err(e) => {
                self.state = before;
                return Err(e);
            }
        };

        if let Err(e) = self.persist(touched) {
            tracing::error!(
                account_id = %self.account_id,
                error = %e,
                "persist failed, changes rolled back"
            );
            self.state = before;
            return Err(e);
        }
        Ok(value)
    }

    fn persist(&self, collections: &[Collection]) -> AppResult<()> {
        let batch = collections
            .iter()
            .map(|&collection| self.encode(collection))
            .collect::<AppResult<Vec<_>>>()?;
        self.store.save_all(&self.account_id, &batch)
    }

    fn encode(&self, collection: Collection) -> AppResult<(Collection, Vec<u8>)> {
        match collection {
            Collection::Orders => encode_json(collection, &self.state.orders.list()),
            Collection::Inventory => encode_json(collection, &self.state.inventory.list()),
            Collection::Products => encode_json(collection, &self.state.catalog.list()),
            Collection::FinanceTransactions => encode_json(collection, &self.state.finance.list()),
        }
    }
}
