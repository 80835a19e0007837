use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::ConnectOptions;
use tracing::info;

use crate::config::WarehouseConfig;
use crate::error::{PipelineError, Result};

const DEFAULT_PORT: u16 = 5432;

/// Builds connection options from the configured URL, or from the individual
/// connection fields when no URL is set.
pub fn connect_options(config: &WarehouseConfig) -> Result<PgConnectOptions> {
    if let Some(url) = config.url.as_deref() {
        return PgConnectOptions::from_str(url)
            .map_err(|err| PipelineError::Config(format!("invalid warehouse URL: {err}")));
    }

    let missing: Vec<&str> = [
        ("user", &config.user),
        ("account", &config.account),
        ("database", &config.database),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_none())
    .map(|(name, _)| name)
    .collect();
    if !missing.is_empty() {
        return Err(PipelineError::Config(format!(
            "warehouse connection is missing: {}",
            missing.join(", ")
        )));
    }

    let (host, port) = split_account(config.account.as_deref().unwrap_or_default())?;
    let mut options = PgConnectOptions::new()
        .host(host)
        .port(port)
        .username(config.user.as_deref().unwrap_or_default())
        .database(config.database.as_deref().unwrap_or_default());

    if let Some(password) = config.password.as_deref() {
        options = options.password(password);
    }
    if let Some(warehouse) = config.warehouse.as_deref() {
        options = options.application_name(warehouse);
    }
    if let Some(schema) = config.schema.as_deref() {
        options = options.options([("search_path", schema)]);
    }

    Ok(options)
}

/// Opens the single connection used for a whole synchronization pass.
pub async fn connect(config: &WarehouseConfig) -> Result<PgConnection> {
    let options = connect_options(config)?;
    let timeout = Duration::from_secs(config.connect_timeout_secs);

    let connection = tokio::time::timeout(timeout, options.connect())
        .await
        .map_err(|_| {
            PipelineError::Connection(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("no connection after {}s", timeout.as_secs()),
            )))
        })?
        .map_err(PipelineError::Connection)?;

    info!(
        host = options.get_host(),
        database = options.get_database().unwrap_or_default(),
        "Warehouse connection established"
    );
    Ok(connection)
}

fn split_account(account: &str) -> Result<(&str, u16)> {
    match account.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse::<u16>().map_err(|_| {
                PipelineError::Config(format!("invalid port in account '{account}'"))
            })?;
            Ok((host, port))
        }
        None => Ok((account, DEFAULT_PORT)),
    }
}
