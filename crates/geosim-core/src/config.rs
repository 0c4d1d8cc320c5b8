use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::str::FromStr;

    fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    }

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value: usize = parse_as(var, &or_default(var, default))?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("GEOSIM_ENV", "development"))?;

    let bind_addr: SocketAddr = parse_as(
        "GEOSIM_BIND_ADDR",
        &or_default("GEOSIM_BIND_ADDR", "0.0.0.0:3000"),
    )?;
    let log_level = or_default("GEOSIM_LOG_LEVEL", "info");
    let catalog_path = lookup("GEOSIM_CATALOG_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let db_max_connections: u32 = parse_as(
        "GEOSIM_DB_MAX_CONNECTIONS",
        &or_default("GEOSIM_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections: u32 = parse_as(
        "GEOSIM_DB_MIN_CONNECTIONS",
        &or_default("GEOSIM_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs: u64 = parse_as(
        "GEOSIM_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("GEOSIM_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    let insert_chunk_size = positive_usize("GEOSIM_INSERT_CHUNK_SIZE", "1000")?;
    let query_row_limit = positive_usize("GEOSIM_QUERY_ROW_LIMIT", "1000")?;

    let containment_margin_deg: f64 = parse_as(
        "GEOSIM_CONTAINMENT_MARGIN_DEG",
        &or_default("GEOSIM_CONTAINMENT_MARGIN_DEG", "0.05"),
    )?;
    if !(containment_margin_deg.is_finite() && containment_margin_deg > 0.0) {
        return Err(ConfigError::InvalidEnvVar {
            var: "GEOSIM_CONTAINMENT_MARGIN_DEG".to_string(),
            reason: format!("{containment_margin_deg} is not a positive number of degrees"),
        });
    }

    let generator_order_count: usize = parse_as(
        "GEOSIM_GENERATOR_ORDER_COUNT",
        &or_default("GEOSIM_GENERATOR_ORDER_COUNT", "50000"),
    )?;
    let generator_window_days: u32 = parse_as(
        "GEOSIM_GENERATOR_WINDOW_DAYS",
        &or_default("GEOSIM_GENERATOR_WINDOW_DAYS", "90"),
    )?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        catalog_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        insert_chunk_size,
        query_row_limit,
        containment_margin_deg,
        generator_order_count,
        generator_window_days,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GEOSIM_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
