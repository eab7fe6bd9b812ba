pub mod repository;
pub use repository::{
    ChangeEvent, ChangeKind, ChangeSubscription, Collection, EventFilter, InventoryRepository,
    Notification, RECENT_LOG_LIMIT,
};
pub mod memory_repo;
pub use memory_repo::{Faults, MemoryInventoryRepository};
pub mod pg_repo;
pub use pg_repo::PgInventoryRepository;
