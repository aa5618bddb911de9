//! Server configuration, read from the environment.

use std::env;

use inkform_db::DbConfig;

/// Runtime configuration for the server binary.
///
/// Every field has a development default and an `INKFORM_*` environment
/// override.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: String,
    pub db: DbConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
            db: DbConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: env_or("INKFORM_BIND_ADDR", defaults.bind_addr),
            db: DbConfig {
                url: env_or("INKFORM_DB_URL", defaults.db.url),
                namespace: env_or("INKFORM_DB_NAMESPACE", defaults.db.namespace),
                database: env_or("INKFORM_DB_DATABASE", defaults.db.database),
                username: env_or("INKFORM_DB_USERNAME", defaults.db.username),
                password: env_or("INKFORM_DB_PASSWORD", defaults.db.password),
            },
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}
