use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_DB_HOST: &str = "db";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_NAME: &str = "inventory";
pub const DEFAULT_ASSET_ROOT: &str = "/tmp/inventory-assets";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// How the asset directory gate is partitioned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AssetLockMode {
    /// One lock per item id, created on demand.
    #[default]
    PerItem,
    /// A single lock shared by every item.
    Global,
}

impl FromStr for AssetLockMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-item" => Ok(AssetLockMode::PerItem),
            "global" => Ok(AssetLockMode::Global),
            other => Err(ConfigError::Invalid {
                name: "ASSET_LOCK_MODE",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    pub server_host: String,
    pub server_port: u16,
    pub asset_root: PathBuf,
    pub asset_lock_mode: AssetLockMode,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = match env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => database_url_from_parts()?,
        };

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string());
        if server_host.is_empty() {
            return Err(ConfigError::Invalid {
                name: "SERVER_HOST",
                value: server_host,
            });
        }

        Ok(Config {
            database_url,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            run_migrations: parse_var("RUN_MIGRATIONS", true)?,
            server_host,
            server_port: parse_port("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            asset_root: env::var("ASSET_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_ASSET_ROOT)),
            asset_lock_mode: match env::var("ASSET_LOCK_MODE") {
                Ok(mode) => mode.parse()?,
                Err(_) => AssetLockMode::default(),
            },
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Builds a connection string from DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASS.
fn database_url_from_parts() -> Result<String, ConfigError> {
    let host = env::var("DB_HOST").unwrap_or_else(|_| DEFAULT_DB_HOST.to_string());
    let port = parse_port("DB_PORT", DEFAULT_DB_PORT)?;
    let name = env::var("DB_NAME").unwrap_or_else(|_| DEFAULT_DB_NAME.to_string());
    let user = env::var("DB_USER").map_err(|_| ConfigError::Missing("DB_USER"))?;
    let pass = env::var("DB_PASS").map_err(|_| ConfigError::Missing("DB_PASS"))?;

    build_database_url(&host, port, &name, &user, &pass)
}

pub fn build_database_url(
    host: &str,
    port: u16,
    name: &str,
    user: &str,
    pass: &str,
) -> Result<String, ConfigError> {
    if host.is_empty() {
        return Err(ConfigError::Invalid {
            name: "DB_HOST",
            value: host.to_string(),
        });
    }
    if name.is_empty() {
        return Err(ConfigError::Invalid {
            name: "DB_NAME",
            value: name.to_string(),
        });
    }
    if user.is_empty() || pass.is_empty() {
        return Err(ConfigError::Missing("DB_USER/DB_PASS"));
    }

    Ok(format!(
        "postgres://{}:{}@{}:{}/{}?sslmode=disable",
        user, pass, host, port, name
    ))
}

fn parse_port(name: &'static str, default: u16) -> Result<u16, ConfigError> {
    let port = parse_var(name, default)?;
    if port == 0 {
        return Err(ConfigError::Invalid {
            name,
            value: port.to_string(),
        });
    }
    Ok(port)
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}
