// handlers/actions/mod.rs - privileged actions
//
// Every handler here hands its raw input to `Gateway::execute` together
// with the action's field rules; the domain call only runs once the
// input is valid, confirmed and carries the master password.

pub mod artisan;      // POST /artisan/run
pub mod backups;      // POST /backups/run|restore|download, DELETE /backups/delete
pub mod environment;  // POST /environment/upsert
pub mod files;        // POST /files/save
pub mod git;          // POST /git/action
pub mod logs;         // POST /logs/tail
pub mod maintenance;  // POST /maintenance/run
pub mod queues;       // POST /queues/flush-failed|clear-pending
pub mod sql;          // POST /sql/run

pub use artisan::artisan_run;
pub use backups::{backup_delete, backup_download, backup_restore, backup_run};
pub use environment::environment_upsert;
pub use files::file_save;
pub use git::git_action;
pub use logs::logs_tail;
pub use maintenance::maintenance_run;
pub use queues::{queues_clear_pending, queues_flush_failed};
pub use sql::sql_run;
