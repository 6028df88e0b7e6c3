use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::database::connection::DatabaseConnectionInfo;
use crate::sandbox::{FileRoot, RootKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub paths: PathConfig,
    pub tools: ToolConfig,
    pub file_roots: Vec<FileRoot>,
    /// `None` when DATABASE_URL is unset or not a MySQL-family URL; the
    /// reason is kept in `database_error` for the overview page.
    pub database: Option<DatabaseConnectionInfo>,
    pub database_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub route_prefix: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub master_password: Option<String>,
}

// Hand-written so the master password never reaches a log line via {:?}.
impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("master_password_set", &self.master_password.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    pub base_path: PathBuf,
    pub backup_path: PathBuf,
    pub log_path: PathBuf,
    pub env_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    pub mysql_dump_binary: String,
    pub git_default_branch: String,
    /// Framework console command line, e.g. `php artisan`.
    pub console: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileRootsFile {
    roots: Vec<FileRootEntry>,
}

#[derive(Debug, Deserialize)]
struct FileRootEntry {
    key: String,
    label: String,
    path: PathBuf,
    #[serde(default)]
    kind: Option<RootKind>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let base_path = non_empty_var("COMMAND_BASE_PATH")
            .map(PathBuf::from)
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        let mut config = Self::defaults(environment, &base_path);
        config.apply_env_overrides();
        config
    }

    pub fn defaults(environment: Environment, base_path: &Path) -> Self {
        Self {
            environment,
            server: ServerConfig {
                port: 3000,
                route_prefix: "/command".to_string(),
            },
            security: SecurityConfig { master_password: None },
            paths: PathConfig {
                base_path: base_path.to_path_buf(),
                backup_path: base_path.join("storage").join("command-backups"),
                log_path: base_path.join("storage").join("logs").join("app.log"),
                env_file: base_path.join(".env"),
            },
            tools: ToolConfig {
                mysql_dump_binary: "mysqldump".to_string(),
                git_default_branch: "main".to_string(),
                console: None,
            },
            file_roots: default_file_roots(base_path),
            database: None,
            database_error: Some("DATABASE_URL is not set".to_string()),
        }
    }

    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Some(v) = non_empty_var("COMMAND_PORT").or_else(|| non_empty_var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Some(v) = non_empty_var("COMMAND_ROUTE_PREFIX") {
            self.server.route_prefix = normalize_prefix(&v);
        }

        // Security overrides; an empty password counts as unset
        self.security.master_password =
            non_empty_var("COMMAND_MASTER_PASSWORD").or_else(|| non_empty_var("ADMIN_TOOL_PASSWORD"));

        // Path overrides
        if let Some(v) = non_empty_var("COMMAND_BACKUP_PATH") {
            self.paths.backup_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty_var("COMMAND_LOG_PATH") {
            self.paths.log_path = PathBuf::from(v);
        }

        // Tool overrides
        if let Some(v) = non_empty_var("COMMAND_MYSQL_DUMP") {
            self.tools.mysql_dump_binary = v;
        }
        if let Some(v) = non_empty_var("COMMAND_GIT_BRANCH") {
            self.tools.git_default_branch = v;
        }
        self.tools.console = non_empty_var("COMMAND_CONSOLE");

        if let Some(v) = non_empty_var("COMMAND_FILE_ROOTS") {
            match load_file_roots(Path::new(&v), &self.paths.base_path) {
                Ok(roots) => self.file_roots = roots,
                Err(e) => tracing::warn!("Ignoring COMMAND_FILE_ROOTS {}: {}", v, e),
            }
        }

        if let Some(url) = non_empty_var("DATABASE_URL") {
            match DatabaseConnectionInfo::from_url(&url) {
                Ok(info) => {
                    self.database = Some(info);
                    self.database_error = None;
                }
                Err(e) => self.database_error = Some(e.to_string()),
            }
        }
    }

    pub fn master_password_set(&self) -> bool {
        self.security.master_password.is_some()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

fn default_file_roots(base_path: &Path) -> Vec<FileRoot> {
    let dir = |key: &str, label: &str| FileRoot {
        key: key.to_string(),
        label: label.to_string(),
        path: base_path.join(key),
        kind: RootKind::Directory,
    };

    vec![
        dir("config", "Config"),
        dir("routes", "Routes"),
        dir("resources", "Resources"),
        dir("app", "App"),
        FileRoot {
            key: "env".to_string(),
            label: ".env".to_string(),
            path: base_path.join(".env"),
            kind: RootKind::File,
        },
    ]
}

/// Load file roots from a YAML document. Relative root paths are taken
/// relative to the project base path.
pub fn load_file_roots(file: &Path, base_path: &Path) -> anyhow::Result<Vec<FileRoot>> {
    let raw = std::fs::read_to_string(file)?;
    parse_file_roots(&raw, base_path)
}

fn parse_file_roots(raw: &str, base_path: &Path) -> anyhow::Result<Vec<FileRoot>> {
    let parsed: FileRootsFile = serde_yaml::from_str(raw)?;
    let mut roots: Vec<FileRoot> = Vec::with_capacity(parsed.roots.len());

    for entry in parsed.roots {
        if roots.iter().any(|r| r.key == entry.key) {
            anyhow::bail!("duplicate file root key '{}'", entry.key);
        }
        let path = if entry.path.is_absolute() {
            entry.path
        } else {
            base_path.join(entry.path)
        };
        roots.push(FileRoot {
            key: entry.key,
            label: entry.label,
            path,
            kind: entry.kind.unwrap_or(RootKind::Directory),
        });
    }

    Ok(roots)
}

// Global singleton config for the binaries - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
