//! Server settings read from the environment (and `.env`, loaded in `main`).

use log::debug;
use report_common::model::datasource::TableDialect;
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_JSON_LIMIT: usize = 10 * 1024 * 1024; // 10 MB
const DEFAULT_UPLOAD_LIMIT: usize = 20 * 1024 * 1024; // 20 MB
const DEFAULT_OUTBOX_DIR: &str = "./outbox";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest JSON body accepted, in bytes.
    pub json_limit: usize,
    /// Largest uploaded table file, in bytes.
    pub upload_limit: usize,
    /// Where delivery jobs write one document per recipient.
    pub outbox_dir: PathBuf,
    pub table_dialect: TableDialect,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            json_limit: DEFAULT_JSON_LIMIT,
            upload_limit: DEFAULT_UPLOAD_LIMIT,
            outbox_dir: PathBuf::from(DEFAULT_OUTBOX_DIR),
            table_dialect: TableDialect::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset or blank keys take their
    /// default; values that do not parse are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = ServerConfig::default();

        if let Some(host) = get("REPORTS_HOST") {
            config.host = host.trim().to_string();
        }
        if let Some(port) = get("REPORTS_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|e| format!("REPORTS_PORT `{}`: {}", port, e))?;
        }
        if let Some(limit) = get("REPORTS_JSON_LIMIT") {
            config.json_limit = limit
                .trim()
                .parse()
                .map_err(|e| format!("REPORTS_JSON_LIMIT `{}`: {}", limit, e))?;
        }
        if let Some(limit) = get("REPORTS_UPLOAD_LIMIT") {
            config.upload_limit = limit
                .trim()
                .parse()
                .map_err(|e| format!("REPORTS_UPLOAD_LIMIT `{}`: {}", limit, e))?;
        }
        if let Some(dir) = get("REPORTS_OUTBOX_DIR") {
            config.outbox_dir = PathBuf::from(dir.trim());
        }
        if let Some(dialect) = get("REPORTS_TABLE_DIALECT") {
            config.table_dialect = dialect
                .parse()
                .map_err(|e| format!("REPORTS_TABLE_DIALECT: {}", e))?;
        }

        debug!("loaded {:?}", config);
        Ok(config)
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
