//! Connections the synchronizer can run statements against.

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgConnection};
use sqlx::query::Query;
use sqlx::{Connection, Postgres, Row};
use tracing::debug;

use crate::config::{StatementMode, WarehouseConfig};
use crate::db;
use crate::error::{PipelineError, Result};
use crate::sql::{SqlValue, Statement};

#[async_trait]
pub trait Warehouse: Send {
    /// Runs a statement whose first column of the first row is a count.
    async fn count(&mut self, statement: &Statement) -> Result<i64>;
    /// Runs a statement for its effect and returns the affected row count.
    async fn execute(&mut self, statement: &Statement) -> Result<u64>;
}

/// A single Postgres-wire connection held for the lifetime of a pass.
pub struct PgWarehouse {
    connection: PgConnection,
    mode: StatementMode,
}

impl PgWarehouse {
    pub fn new(connection: PgConnection, mode: StatementMode) -> Self {
        Self { connection, mode }
    }

    pub async fn connect(config: &WarehouseConfig, mode: StatementMode) -> Result<Self> {
        let connection = db::connect(config).await?;
        Ok(Self::new(connection, mode))
    }

    pub async fn close(self) -> Result<()> {
        self.connection
            .close()
            .await
            .map_err(PipelineError::Connection)
    }
}

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

fn bind_params<'q>(mut query: PgQuery<'q>, params: &'q [SqlValue]) -> PgQuery<'q> {
    for param in params {
        query = match param {
            SqlValue::Text(value) => query.bind(value.as_deref()),
            SqlValue::Integer(value) => query.bind(*value),
            SqlValue::Float(value) => query.bind(*value),
        };
    }
    query
}

fn classify(statement: &str, err: sqlx::Error) -> PipelineError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => PipelineError::Connection(err),
        source => PipelineError::Query {
            statement: statement.to_string(),
            source,
        },
    }
}

#[async_trait]
impl Warehouse for PgWarehouse {
    async fn count(&mut self, statement: &Statement) -> Result<i64> {
        let row = match self.mode {
            StatementMode::Bound => {
                debug!(sql = statement.sql(), params = statement.params().len(), "Executing SQL");
                bind_params(sqlx::query(statement.sql()), statement.params())
                    .fetch_one(&mut self.connection)
                    .await
                    .map_err(|err| classify(statement.sql(), err))?
            }
            StatementMode::Inline => {
                let text = statement.render_inline();
                debug!(sql = %text, "Executing SQL");
                sqlx::query(&text)
                    .fetch_one(&mut self.connection)
                    .await
                    .map_err(|err| classify(&text, err))?
            }
        };

        row.try_get::<i64, _>(0)
            .map_err(|err| classify(statement.sql(), err))
    }

    async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        let result = match self.mode {
            StatementMode::Bound => {
                debug!(sql = statement.sql(), params = statement.params().len(), "Executing SQL");
                bind_params(sqlx::query(statement.sql()), statement.params())
                    .execute(&mut self.connection)
                    .await
                    .map_err(|err| classify(statement.sql(), err))?
            }
            StatementMode::Inline => {
                let text = statement.render_inline();
                debug!(sql = %text, "Executing SQL");
                sqlx::query(&text)
                    .execute(&mut self.connection)
                    .await
                    .map_err(|err| classify(&text, err))?
            }
        };

        Ok(result.rows_affected())
    }
}

/// Records statements instead of running them; every ID looks absent.
#[derive(Debug, Default)]
pub struct DryRunWarehouse {
    statements: Vec<String>,
}

impl DryRunWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn into_statements(self) -> Vec<String> {
        self.statements
    }
}

#[async_trait]
impl Warehouse for DryRunWarehouse {
    async fn count(&mut self, statement: &Statement) -> Result<i64> {
        self.statements.push(statement.render_inline());
        Ok(0)
    }

    async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        self.statements.push(statement.render_inline());
        Ok(0)
    }
}
