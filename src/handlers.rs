pub mod categories;
pub mod inventory;
pub mod logs;
pub mod session;
pub mod spreadsheet;
