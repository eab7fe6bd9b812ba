pub mod inventory;
pub mod log;
