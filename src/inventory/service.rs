use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tracing::info;

use super::domain::{InventoryItem, ItemDraft, ItemStatusView, StockTransaction, TransactionKind};
use super::repository::{InventoryRepository, RepositoryError};

/// Notification emitted after a successful inventory mutation, so sibling
/// views (ingredient tracker, analytics) can refresh. Listeners are
/// registered explicitly by the owning container; there is no ambient
/// event bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    ItemAdded { id: u64 },
    ItemUpdated { id: u64 },
    ItemRemoved { id: u64 },
    TransactionRecorded { id: u64, kind: TransactionKind },
}

/// Callback interface for inventory change notifications.
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, event: &InventoryEvent);
}

/// Service composing the repository, the update-form validation rules, and
/// change fan-out.
pub struct InventoryService<R> {
    repository: Arc<R>,
    listeners: Mutex<Vec<Arc<dyn ChangeListener>>>,
}

static ITEM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_item_id() -> u64 {
    ITEM_SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

impl<R> InventoryService<R>
where
    R: InventoryRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Register a listener for subsequent mutations.
    pub fn subscribe(&self, listener: Arc<dyn ChangeListener>) {
        let mut listeners = match self.listeners.lock() {
            Ok(guard) => guard,
            // The list is append-only, so a poisoned lock still holds a
            // usable value.
            Err(poisoned) => poisoned.into_inner(),
        };
        listeners.push(listener);
    }

    fn notify(&self, event: InventoryEvent) {
        let listeners = match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for listener in listeners.iter() {
            listener.on_change(&event);
        }
    }

    /// Store a new item under a fresh id.
    pub fn add_item(&self, draft: ItemDraft) -> Result<InventoryItem, ServiceError> {
        validate_draft(&draft)?;

        let item = draft.into_item(next_item_id());
        let stored = self.repository.insert(item)?;
        info!(id = stored.id, name = %stored.name, "inventory item added");
        self.notify(InventoryEvent::ItemAdded { id: stored.id });
        Ok(stored)
    }

    /// Replace an item's fields wholesale, enforcing the edit-form rules.
    pub fn update_item(&self, id: u64, draft: ItemDraft) -> Result<InventoryItem, ServiceError> {
        validate_draft(&draft)?;

        if self.repository.fetch(id)?.is_none() {
            return Err(RepositoryError::NotFound.into());
        }

        let item = draft.into_item(id);
        self.repository.update(item.clone())?;
        self.notify(InventoryEvent::ItemUpdated { id });
        Ok(item)
    }

    pub fn remove_item(&self, id: u64) -> Result<(), ServiceError> {
        self.repository.remove(id)?;
        info!(id, "inventory item removed");
        self.notify(InventoryEvent::ItemRemoved { id });
        Ok(())
    }

    pub fn get_item(&self, id: u64) -> Result<InventoryItem, ServiceError> {
        let item = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(item)
    }

    /// Apply a stock movement. Purchases add quantity; usage, waste, and
    /// donation consume it and may not exceed what is on hand.
    pub fn record_transaction(
        &self,
        id: u64,
        transaction: StockTransaction,
    ) -> Result<InventoryItem, ServiceError> {
        if transaction.quantity <= 0.0 {
            return Err(ServiceError::Validation {
                reason: "transaction quantity must be greater than zero".to_string(),
            });
        }

        let mut item = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;

        if !transaction.kind.adds_stock() && transaction.quantity > item.current_quantity {
            return Err(ServiceError::Validation {
                reason: format!(
                    "cannot record {} of {} {}: only {} on hand",
                    transaction.kind.label().to_lowercase(),
                    transaction.quantity,
                    item.unit,
                    item.current_quantity
                ),
            });
        }

        if transaction.kind.adds_stock() {
            item.current_quantity += transaction.quantity;
        } else {
            item.current_quantity -= transaction.quantity;
        }

        self.repository.update(item.clone())?;
        info!(
            id,
            kind = transaction.kind.label(),
            quantity = transaction.quantity,
            "stock transaction recorded"
        );
        self.notify(InventoryEvent::TransactionRecorded {
            id,
            kind: transaction.kind,
        });
        Ok(item)
    }

    /// Every item with its derived status for the given evaluation date.
    pub fn snapshot(&self, today: NaiveDate) -> Result<Vec<ItemStatusView>, ServiceError> {
        let views = self
            .repository
            .list()?
            .iter()
            .map(|item| item.status_view(today))
            .collect();
        Ok(views)
    }
}

/// The edit form's rules, enforced at the service boundary: a name is
/// required, quantities and cost cannot be negative, and the minimum bound
/// may not exceed the maximum.
fn validate_draft(draft: &ItemDraft) -> Result<(), ServiceError> {
    if draft.name.trim().is_empty() {
        return Err(ServiceError::Validation {
            reason: "item name is required".to_string(),
        });
    }
    if draft.current_quantity < 0.0
        || draft.min_quantity < 0.0
        || draft.max_quantity < 0.0
        || draft.cost_per_unit < 0.0
    {
        return Err(ServiceError::Validation {
            reason: "quantities and cost cannot be negative".to_string(),
        });
    }
    if draft.min_quantity > draft.max_quantity {
        return Err(ServiceError::Validation {
            reason: "min quantity cannot be greater than max quantity".to_string(),
        });
    }
    Ok(())
}

/// Error raised by the inventory service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{reason}")]
    Validation { reason: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
