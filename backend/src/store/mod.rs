//! Durable key-value storage, one blob per (account, collection)

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::AppResult;

/// The collections kept for each account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Orders,
    Inventory,
    Products,
    FinanceTransactions,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Orders => "orders",
            Collection::Inventory => "inventory",
            Collection::Products => "products",
            Collection::FinanceTransactions => "finance-transactions",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generic durable store.
///
/// Implementations are assumed reliable; their failures are surfaced to the
/// caller unmodified.
pub trait DurableStore: Send + Sync {
    fn load(&self, account_id: &str, collection: Collection) -> AppResult<Option<Vec<u8>>>;

    fn save(&self, account_id: &str, collection: Collection, bytes: &[u8]) -> AppResult<()>;

    /// Write several collections as one unit. The default writes them in
    /// order; stores that can do better override it.
    fn save_all(&self, account_id: &str, batch: &[(Collection, Vec<u8>)]) -> AppResult<()> {
        for (collection, bytes) in batch {
            self.save(account_id, *collection, bytes)?;
        }
        Ok(())
    }
}

/// Decode a collection, `None` when it has never been saved
pub fn load_json<T: DeserializeOwned>(
    store: &dyn DurableStore,
    account_id: &str,
    collection: Collection,
) -> AppResult<Option<T>> {
    match store.load(account_id, collection)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

pub fn encode_json<T: Serialize>(
    collection: Collection,
    value: &T,
) -> AppResult<(Collection, Vec<u8>)> {
    Ok((collection, serde_json::to_vec(value)?))
}
