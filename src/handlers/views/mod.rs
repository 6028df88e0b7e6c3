// handlers/views/mod.rs - read-only state for the admin screens
//
// Nothing here mutates anything, so none of it goes through the gateway.
// The master password is only ever reported as configured or not.

pub mod backups;      // GET /backups
pub mod environment;  // GET /environment
pub mod files;        // GET /files
pub mod health;       // GET /health
pub mod logs;         // GET /logs
pub mod overview;     // GET /

pub use backups::backups_list;
pub use environment::environment_list;
pub use files::files_index;
pub use health::health;
pub use logs::logs_view;
pub use overview::overview;
