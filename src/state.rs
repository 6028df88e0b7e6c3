use std::sync::Arc;

use crate::backup::BackupService;
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::gateway::Gateway;
use crate::sandbox::PathSandbox;
use crate::services::{Console, EnvFile, Git};

const POOL_SIZE: u32 = 5;

/// Everything a request needs, built once from the configuration
/// snapshot and shared read-only between handlers.
pub struct AppState {
    pub config: AppConfig,
    pub gateway: Gateway,
    pub sandbox: PathSandbox,
    pub backups: BackupService,
    pub database: DatabaseManager,
    pub env_file: EnvFile,
    pub console: Console,
    pub git: Git,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Must run inside a tokio runtime when a database is configured
    pub fn from_config(config: AppConfig) -> Self {
        let base = config.paths.base_path.clone();

        Self {
            gateway: Gateway::new(config.security.master_password.clone()),
            sandbox: PathSandbox::new(config.file_roots.clone()),
            backups: BackupService::new(&config.paths.backup_path, &config.tools.mysql_dump_binary, &base),
            database: DatabaseManager::new(config.database.clone(), config.database_error.clone(), POOL_SIZE),
            env_file: EnvFile::new(&config.paths.env_file),
            console: Console::new(config.tools.console.clone(), &base),
            git: Git::new(&base, &config.tools.git_default_branch),
            config,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}
