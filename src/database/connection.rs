use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlConnectOptions;

use super::manager::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineFamily {
    MySql,
    MariaDb,
}

/// Connection parameters for the primary database. Only MySQL-family
/// engines are accepted.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConnectionInfo {
    pub engine: EngineFamily,
    pub host: String,
    pub port: u16,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub database: String,
}

impl std::fmt::Debug for DatabaseConnectionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConnectionInfo")
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("database", &self.database)
            .finish()
    }
}

impl DatabaseConnectionInfo {
    pub fn from_url(raw: &str) -> Result<Self, DatabaseError> {
        let url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let engine = match url.scheme() {
            "mysql" => EngineFamily::MySql,
            "mariadb" => EngineFamily::MariaDb,
            _ => return Err(DatabaseError::UnsupportedEngine),
        };

        let database = url.path().trim_start_matches('/').to_string();
        if database.is_empty() {
            return Err(DatabaseError::ConfigMissing("database name in DATABASE_URL"));
        }

        let username = percent_decode(url.username());
        Ok(Self {
            engine,
            host: url.host_str().unwrap_or("127.0.0.1").to_string(),
            port: url.port().unwrap_or(3306),
            username: if username.is_empty() { "root".to_string() } else { username },
            password: url.password().map(percent_decode).filter(|p| !p.is_empty()),
            database,
        })
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .database(&self.database)
            .charset("utf8mb4");
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        options
    }
}

fn percent_decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
