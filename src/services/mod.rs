pub mod console;
pub mod env_file;
pub mod git;
pub mod log_tail;
pub mod process;
pub mod queues;
pub mod sql_console;

pub use console::{Console, ConsoleRun};
pub use env_file::{EnvEntry, EnvFile};
pub use git::{Git, GitInfo, GitRun};
pub use log_tail::LogTail;
pub use sql_console::{SqlResult, SqlRun};
