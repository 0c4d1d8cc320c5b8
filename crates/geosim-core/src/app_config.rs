use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// `None` selects the built-in Bengaluru catalog.
    pub catalog_path: Option<PathBuf>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Rows per `INSERT` statement when loading generated data.
    pub insert_chunk_size: usize,
    /// Default cap on rows returned by an analysis.
    pub query_row_limit: usize,
    /// Half-width in degrees of the square used by zone containment.
    pub containment_margin_deg: f64,
    pub generator_order_count: usize,
    pub generator_window_days: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("catalog_path", &self.catalog_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("insert_chunk_size", &self.insert_chunk_size)
            .field("query_row_limit", &self.query_row_limit)
            .field("containment_margin_deg", &self.containment_margin_deg)
            .field("generator_order_count", &self.generator_order_count)
            .field("generator_window_days", &self.generator_window_days)
            .finish()
    }
}

impl AppConfig {
    /// Resolve the configured catalog, falling back to the built-in one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError`] if a configured catalog file cannot be
    /// loaded or fails validation.
    pub fn catalog(&self) -> Result<crate::Catalog, crate::ConfigError> {
        match &self.catalog_path {
            Some(path) => crate::load_catalog(path),
            None => Ok(crate::Catalog::bengaluru()),
        }
    }
}
