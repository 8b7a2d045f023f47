pub mod migrations;
pub mod store;
pub mod watcher;

pub use store::SqliteStore;
