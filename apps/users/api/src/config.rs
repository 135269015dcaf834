use core_config::{app_info, env_parse_or_default, server::ServerConfig, AppInfo, FromEnv};
use database::postgres::PostgresConfig;
use std::fmt;
use std::str::FromStr;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Backend holding the users
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UserStore {
    /// Process-local map, lost on restart
    #[default]
    Memory,
    Postgres,
}

impl FromStr for UserStore {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(UserStore::Memory),
            "postgres" => Ok(UserStore::Postgres),
            other => Err(format!(
                "unknown user store '{}', expected 'memory' or 'postgres'",
                other
            )),
        }
    }
}

impl fmt::Display for UserStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStore::Memory => write!(f, "memory"),
            UserStore::Postgres => write!(f, "postgres"),
        }
    }
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub store: UserStore,
    /// Present only when `store` is [`UserStore::Postgres`]
    pub database: Option<PostgresConfig>,
}

impl Config {
    /// `USER_STORE` selects the backend (default `memory`); `DATABASE_URL`
    /// is required only for `postgres`.
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let store: UserStore = env_parse_or_default("USER_STORE", "memory")?;

        let database = match store {
            UserStore::Postgres => Some(PostgresConfig::from_env()?),
            UserStore::Memory => None,
        };

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            store,
            database,
        })
    }
}
