pub mod backend;
pub mod database;
pub mod offline;
