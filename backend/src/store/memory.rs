use std::collections::HashMap;
use std::sync::RwLock;

use super::{Collection, DurableStore};
use crate::error::{AppError, AppResult};

/// In-process store, used by tests and embedders that persist elsewhere
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<(String, Collection), Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, account_id: &str, collection: Collection) -> bool {
        self.blobs
            .read()
            .map(|blobs| blobs.contains_key(&(account_id.to_string(), collection)))
            .unwrap_or(false)
    }
}

fn poisoned() -> AppError {
    AppError::Storage("memory store lock poisoned".to_string())
}

impl DurableStore for MemoryStore {
    fn load(&self, account_id: &str, collection: Collection) -> AppResult<Option<Vec<u8>>> {
        let blobs = self.blobs.read().map_err(|_| poisoned())?;
        Ok(blobs.get(&(account_id.to_string(), collection)).cloned())
    }

    fn save(&self, account_id: &str, collection: Collection, bytes: &[u8]) -> AppResult<()> {
        let mut blobs = self.blobs.write().map_err(|_| poisoned())?;
        blobs.insert((account_id.to_string(), collection), bytes.to_vec());
        Ok(())
    }

    fn save_all(&self, account_id: &str, batch: &[(Collection, Vec<u8>)]) -> AppResult<()> {
        let mut blobs = self.blobs.write().map_err(|_| poisoned())?;
        for (collection, bytes) in batch {
            blobs.insert((account_id.to_string(), *collection), bytes.clone());
        }
        Ok(())
    }
}
