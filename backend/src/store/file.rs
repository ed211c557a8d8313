use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{Collection, DurableStore};
use crate::error::{AppError, AppResult};

const MANIFEST: &str = "manifest.json";

/// JSON files under `<root>/<account>/`.
///
/// Each save writes its collections to fresh `<collection>.<generation>.json`
/// files, then commits by renaming a new `manifest.json` into place. The
/// manifest names the live generation of every collection, so a batch is
/// either fully visible or not at all, and files left by a failed save are
/// never read.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

/// Live generation of each collection of one account
#[derive(Debug, Default, Serialize, Deserialize)]
struct Manifest {
    generation: u64,
    collections: BTreeMap<String, u64>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn account_dir(&self, account_id: &str) -> AppResult<PathBuf> {
        let valid = !account_id.is_empty()
            && account_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AppError::Storage(format!("invalid account id: {:?}", account_id)));
        }
        Ok(self.root.join(account_id))
    }

    fn read_manifest(&self, dir: &Path) -> AppResult<Manifest> {
        let path = dir.join(MANIFEST);
        match fs::read(&path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Manifest::default()),
            Err(e) => Err(io_error("read", &path, e)),
        }
    }

    /// The commit point: one rename swaps every collection at once
    fn write_manifest(&self, dir: &Path, manifest: &Manifest) -> AppResult<()> {
        let target = dir.join(MANIFEST);
        let temp = target.with_extension("json.tmp");
        fs::write(&temp, serde_json::to_vec(manifest)?)
            .map_err(|e| io_error("write", &temp, e))?;
        fs::rename(&temp, &target).map_err(|e| io_error("rename", &target, e))
    }
}

fn data_path(dir: &Path, collection: Collection, generation: u64) -> PathBuf {
    dir.join(format!("{}.{}.json", collection.as_str(), generation))
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> AppError {
    AppError::Storage(format!("{} {}: {}", action, path.display(), err))
}

fn discard(paths: &[PathBuf]) {
    for path in paths {
        let _ = fs::remove_file(path);
    }
}

impl DurableStore for FileStore {
    fn load(&self, account_id: &str, collection: Collection) -> AppResult<Option<Vec<u8>>> {
        let dir = self.account_dir(account_id)?;
        let manifest = self.read_manifest(&dir)?;
        let Some(&generation) = manifest.collections.get(collection.as_str()) else {
            return Ok(None);
        };

        let path = data_path(&dir, collection, generation);
        fs::read(&path).map(Some).map_err(|e| io_error("read", &path, e))
    }

    fn save(&self, account_id: &str, collection: Collection, bytes: &[u8]) -> AppResult<()> {
        self.save_all(account_id, &[(collection, bytes.to_vec())])
    }

    fn save_all(&self, account_id: &str, batch: &[(Collection, Vec<u8>)]) -> AppResult<()> {
        let dir = self.account_dir(account_id)?;
        fs::create_dir_all(&dir).map_err(|e| io_error("create account directory", &dir, e))?;

        let mut manifest = self.read_manifest(&dir)?;
        let generation = manifest.generation + 1;

        let mut written = Vec::with_capacity(batch.len());
        for (collection, bytes) in batch {
            let path = data_path(&dir, *collection, generation);
            if let Err(e) = fs::write(&path, bytes) {
                discard(&written);
                return Err(io_error("write", &path, e));
            }
            written.push(path);
        }

        let mut superseded = Vec::new();
        for (collection, _) in batch {
            let previous = manifest
                .collections
                .insert(collection.as_str().to_string(), generation);
            if let Some(old) = previous.filter(|old| *old != generation) {
                superseded.push(data_path(&dir, *collection, old));
            }
        }
        manifest.generation = generation;

        if let Err(e) = self.write_manifest(&dir, &manifest) {
            discard(&written);
            return Err(e);
        }

        for path in &superseded {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "could not remove superseded file"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collection_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert_eq!(store.load("shop", Collection::Orders).unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save("shop", Collection::FinanceTransactions, b"[]").unwrap();

        assert_eq!(
            store.load("shop", Collection::FinanceTransactions).unwrap(),
            Some(b"[]".to_vec())
        );
        assert_eq!(store.load("shop", Collection::Orders).unwrap(), None);
        assert!(dir.path().join("shop").join("finance-transactions.1.json").exists());
        assert!(!dir.path().join("shop").join("manifest.json.tmp").exists());
    }

    #[test]
    fn test_superseded_generations_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save("shop", Collection::Orders, b"[1]").unwrap();
        store.save("shop", Collection::Inventory, b"[2]").unwrap();
        store.save("shop", Collection::Orders, b"[3]").unwrap();

        let account = dir.path().join("shop");
        assert!(!account.join("orders.1.json").exists());
        assert!(account.join("inventory.2.json").exists());
        assert!(account.join("orders.3.json").exists());
        assert_eq!(store.load("shop", Collection::Orders).unwrap(), Some(b"[3]".to_vec()));
        assert_eq!(store.load("shop", Collection::Inventory).unwrap(), Some(b"[2]".to_vec()));
    }

    #[test]
    fn test_failed_commit_keeps_previous_batch() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store
            .save_all(
                "shop",
                &[
                    (Collection::Orders, b"[\"old\"]".to_vec()),
                    (Collection::Inventory, b"[\"old\"]".to_vec()),
                ],
            )
            .unwrap();

        // A directory where the manifest is staged makes the commit fail
        let blocker = dir.path().join("shop").join("manifest.json.tmp");
        fs::create_dir(&blocker).unwrap();
        let batch = [
            (Collection::Orders, b"[\"new\"]".to_vec()),
            (Collection::Inventory, b"[\"new\"]".to_vec()),
        ];
        assert!(store.save_all("shop", &batch).is_err());

        let old = Some(b"[\"old\"]".to_vec());
        assert_eq!(store.load("shop", Collection::Orders).unwrap(), old);
        assert_eq!(store.load("shop", Collection::Inventory).unwrap(), old);
        assert!(!dir.path().join("shop").join("orders.2.json").exists());

        fs::remove_dir(&blocker).unwrap();
        store.save_all("shop", &batch).unwrap();
        let new = Some(b"[\"new\"]".to_vec());
        assert_eq!(store.load("shop", Collection::Orders).unwrap(), new);
        assert_eq!(store.load("shop", Collection::Inventory).unwrap(), new);
    }

    #[test]
    fn test_stray_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save("shop", Collection::Orders, b"[]").unwrap();

        // Left behind by a save that never committed
        fs::write(dir.path().join("shop").join("orders.2.json"), b"[\"stray\"]").unwrap();

        assert_eq!(store.load("shop", Collection::Orders).unwrap(), Some(b"[]".to_vec()));
    }

    #[test]
    fn test_account_id_cannot_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.save("../other", Collection::Orders, b"[]").is_err());
        assert!(store.load("", Collection::Orders).is_err());
    }
}
