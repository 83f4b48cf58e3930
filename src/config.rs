use crate::error::{ApiResult, BadEnvVarSnafu, ParsePortSnafu, UnknownStoreKindSnafu};
use dotenvy::var;
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;
use std::{str::FromStr, sync::Arc};

const DEFAULT_SERVER_IP: &str = "127.0.0.1:8080";

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    server_ip: String,
    store_config: StoreConfig,
}

impl RuntimeConfiguration {
    pub fn new() -> ApiResult<Self> {
        let server_ip =
            var("STUDENTS_SERVER_IP").unwrap_or_else(|_| DEFAULT_SERVER_IP.to_string());

        let kind = match var("STUDENTS_STORE") {
            Ok(kind) => kind.parse()?,
            Err(_) => StoreKind::default(),
        };
        let store_config = match kind {
            StoreKind::InMemory => StoreConfig::InMemory,
            StoreKind::Postgres => StoreConfig::Postgres(Arc::new(DbConfig::new()?)),
        };

        Ok(Self {
            server_ip,
            store_config,
        })
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }

    pub fn store_config(&self) -> StoreConfig {
        self.store_config.clone()
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StoreKind {
    #[default]
    InMemory,
    Postgres,
}

impl FromStr for StoreKind {
    type Err = crate::error::ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => UnknownStoreKindSnafu { original: s }.fail(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum StoreConfig {
    InMemory,
    Postgres(Arc<DbConfig>),
}

#[derive(Debug)]
pub struct DbConfig {
    user: String,
    password: SecretString,
    path: String,
    port: u16,
    database: String,
}

impl DbConfig {
    pub fn new() -> ApiResult<Self> {
        let get_env_var = |name| var(name).context(BadEnvVarSnafu { name });

        Ok(Self {
            user: get_env_var("DB_USER")?,
            password: SecretString::from(get_env_var("DB_PASSWORD")?),
            path: get_env_var("DB_PATH")?,
            port: get_env_var("DB_PORT")?.parse().context(ParsePortSnafu)?,
            database: get_env_var("DB_NAME")?,
        })
    }

    pub fn get_db_path(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user,
            self.password.expose_secret(),
            self.path,
            self.port,
            self.database
        )
    }
}
