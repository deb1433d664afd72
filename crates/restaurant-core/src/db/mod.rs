//! Local persistent store for Restaurant Reviews

mod connection;
mod local_store;
mod migrations;

pub use connection::Database;
pub use local_store::LocalStore;
pub use migrations::CURRENT_VERSION;
