// crates/figures-core/src/config.rs

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::clean::CleanOptions;
use crate::error::{PipelineError, Result};
use crate::sql::{TableName, DEFAULT_TABLE};

pub const DEFAULT_DATA_PATH: &str = "data/AgeDataset.csv";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Source CSV, relative paths resolve against the working directory.
    pub data_path: PathBuf,
    pub clean: CleanOptions,
    pub sync: SyncConfig,
    pub warehouse: WarehouseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            clean: CleanOptions::default(),
            sync: SyncConfig::default(),
            warehouse: WarehouseConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementMode {
    /// Parameters travel separately from the SQL text.
    #[default]
    Bound,
    /// Parameters are rendered into the SQL text as escaped literals.
    Inline,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub table: String,
    pub statement_mode: StatementMode,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            statement_mode: StatementMode::default(),
        }
    }
}

impl SyncConfig {
    pub fn table_name(&self) -> Result<TableName> {
        TableName::new(&self.table)
    }
}

#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WarehouseConfig {
    /// Full connection URL; takes precedence over the individual fields.
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// `host[:port]` of the warehouse endpoint.
    pub account: Option<String>,
    /// Reported to the server as the session's application name.
    pub warehouse: Option<String>,
    pub database: Option<String>,
    /// Becomes the session `search_path`.
    pub schema: Option<String>,
    pub connect_timeout_secs: u64,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            url: None,
            user: None,
            password: None,
            account: None,
            warehouse: None,
            database: None,
            schema: None,
            connect_timeout_secs: 30,
        }
    }
}

impl fmt::Debug for WarehouseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehouseConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("account", &self.account)
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| PipelineError::Config(err.to_string()))
    }

    /// Reads `path` when given, otherwise starts from defaults, then applies
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|err| {
                    PipelineError::Config(format!("cannot read {}: {err}", path.display()))
                })?;
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overrides file values with `FIGURES_*` variables resolved through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("FIGURES_DATA_PATH") {
            self.data_path = PathBuf::from(path);
        }
        if let Some(table) = lookup("FIGURES_TABLE") {
            self.sync.table = table;
        }

        let warehouse = &mut self.warehouse;
        if let Some(url) = lookup("FIGURES_DATABASE_URL").or_else(|| lookup("DATABASE_URL")) {
            warehouse.url = Some(url);
        }
        let fields: [(&str, &mut Option<String>); 6] = [
            ("FIGURES_USER", &mut warehouse.user),
            ("FIGURES_PASSWORD", &mut warehouse.password),
            ("FIGURES_ACCOUNT", &mut warehouse.account),
            ("FIGURES_WAREHOUSE", &mut warehouse.warehouse),
            ("FIGURES_DATABASE", &mut warehouse.database),
            ("FIGURES_SCHEMA", &mut warehouse.schema),
        ];
        for (key, slot) in fields {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
            }
        }
    }
}
