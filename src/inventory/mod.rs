//! Kitchen inventory tracking: stock records with quantity bounds and
//! optional expiry, the status classifier driving the dashboard badges,
//! and the CRUD/transaction service behind the inventory table.

mod domain;
mod repository;
mod router;
mod service;

pub use domain::{
    InventoryItem, ItemDraft, ItemStatusView, StockStatus, StockTransaction, TransactionKind,
};
pub use repository::{InventoryRepository, MemoryRepository, RepositoryError};
pub use router::inventory_router;
pub use service::{ChangeListener, InventoryEvent, InventoryService, ServiceError};
