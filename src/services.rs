pub mod audit;
pub mod inventory_service;
pub use inventory_service::InventoryService;
pub mod inventory_store;
pub use inventory_store::InventoryStore;
pub mod query_service;
pub mod session_gate;
pub use session_gate::{FileSessionMarker, MemorySessionMarker, SessionGate, SessionMarker};
pub mod spreadsheet_service;
pub use spreadsheet_service::{CsvSheetCodec, SheetCodec, SpreadsheetService};
