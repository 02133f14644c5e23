mod mappers;
pub mod memory_store;
mod rows;
pub mod sqlite_store;

pub use memory_store::MemoryLocalStore;
pub use sqlite_store::{LOCAL_STORE_SCHEMA_VERSION, SqliteLocalStore};
