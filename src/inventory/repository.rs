use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::InventoryItem;

/// Storage abstraction so the service module can be exercised in
/// isolation. The production store is in-memory; durable persistence is
/// owned elsewhere.
pub trait InventoryRepository: Send + Sync {
    fn insert(&self, item: InventoryItem) -> Result<InventoryItem, RepositoryError>;
    fn update(&self, item: InventoryItem) -> Result<(), RepositoryError>;
    fn fetch(&self, id: u64) -> Result<Option<InventoryItem>, RepositoryError>;
    fn remove(&self, id: u64) -> Result<(), RepositoryError>;
    fn list(&self) -> Result<Vec<InventoryItem>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("item already exists")]
    Conflict,
    #[error("item not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// In-memory store keyed by item id. BTreeMap keeps listings in id order,
/// which is the insertion order under the service's sequential ids.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    items: Mutex<BTreeMap<u64, InventoryItem>>,
}

impl MemoryRepository {
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<u64, InventoryItem>>, RepositoryError> {
        self.items
            .lock()
            .map_err(|_| RepositoryError::Unavailable("inventory store poisoned".to_string()))
    }
}

impl InventoryRepository for MemoryRepository {
    fn insert(&self, item: InventoryItem) -> Result<InventoryItem, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&item.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(item.id, item.clone());
        Ok(item)
    }

    fn update(&self, item: InventoryItem) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if !guard.contains_key(&item.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(item.id, item);
        Ok(())
    }

    fn fetch(&self, id: u64) -> Result<Option<InventoryItem>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(&id).cloned())
    }

    fn remove(&self, id: u64) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        guard.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn list(&self) -> Result<Vec<InventoryItem>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.values().cloned().collect())
    }
}
