pub mod connection;
pub mod manager;
pub mod rows;

pub use connection::{DatabaseConnectionInfo, EngineFamily};
pub use manager::{DatabaseError, DatabaseManager};
pub use rows::SqlValue;
