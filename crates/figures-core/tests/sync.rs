use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use figures_core::error::{PipelineError, Result as PipelineResult};
use figures_core::record::{Record, Year};
use figures_core::sql::{Statement, TableName};
use figures_core::sync::{sync_records, SyncReport};
use figures_core::warehouse::{DryRunWarehouse, Warehouse};

/// Answers existence checks from a fixed set of IDs and logs every statement.
#[derive(Default)]
struct ScriptedWarehouse {
    existing: HashSet<String>,
    fail_on: Option<String>,
    log: Vec<String>,
}

impl ScriptedWarehouse {
    fn with_existing(ids: &[&str]) -> Self {
        Self {
            existing: ids.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    fn inserts(&self) -> Vec<&String> {
        self.log.iter().filter(|sql| sql.starts_with("INSERT")).collect()
    }
}

#[async_trait]
impl Warehouse for ScriptedWarehouse {
    async fn count(&mut self, statement: &Statement) -> PipelineResult<i64> {
        let sql = statement.render_inline();
        self.log.push(sql.clone());

        if let Some(fail_on) = &self.fail_on {
            if sql.ends_with(&format!("'{fail_on}'")) {
                return Err(PipelineError::Connection(sqlx::Error::PoolClosed));
            }
        }

        let hit = self
            .existing
            .iter()
            .any(|id| sql.ends_with(&format!("WHERE ID = '{id}'")));
        Ok(i64::from(hit))
    }

    async fn execute(&mut self, statement: &Statement) -> PipelineResult<u64> {
        self.log.push(statement.render_inline());
        Ok(1)
    }
}

fn record(id: &str) -> Record {
    let mut record = Record::new(id).with_years(Year::new(1911), Year::new(1966));
    record.name = Some("Flann O'Brien".to_string());
    record.short_description = Some("Irish novelist, playwright".to_string());
    record
}

#[tokio::test]
async fn absent_id_gets_one_check_and_one_insert() -> Result<()> {
    let mut warehouse = ScriptedWarehouse::default();
    let report = sync_records(&mut warehouse, &TableName::default(), &[record("42")]).await?;

    assert_eq!(
        report,
        SyncReport {
            examined: 1,
            inserted: 1,
            skipped: 0
        }
    );
    assert_eq!(warehouse.log.len(), 2);
    assert_eq!(
        warehouse.log[0],
        "SELECT COUNT(*) FROM historical_figures WHERE ID = '42'"
    );
    let inserts = warehouse.inserts();
    assert_eq!(inserts.len(), 1);
    assert!(inserts[0].starts_with("INSERT INTO historical_figures (ID, NAME,"));
    assert!(inserts[0].contains("VALUES ('42', 'Flann O''Brien', 'Irish novelist playwright'"));
    assert!(warehouse.log.iter().all(|sql| !sql.starts_with("UPDATE")));
    Ok(())
}

#[tokio::test]
async fn present_id_is_left_alone() -> Result<()> {
    let mut warehouse = ScriptedWarehouse::with_existing(&["42"]);
    let report = sync_records(&mut warehouse, &TableName::default(), &[record("42")]).await?;

    assert_eq!(report.inserted, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(warehouse.log.len(), 1);
    assert!(warehouse.inserts().is_empty());
    Ok(())
}

#[tokio::test]
async fn records_are_processed_in_order() -> Result<()> {
    let mut warehouse = ScriptedWarehouse::with_existing(&["b"]);
    let records = [record("a"), record("b"), record("c")];
    let report = sync_records(&mut warehouse, &TableName::default(), &records).await?;

    assert_eq!(report.examined, 3);
    assert_eq!(report.inserted, 2);
    let inserted_ids: Vec<&str> = warehouse
        .inserts()
        .iter()
        .map(|sql| if sql.contains("VALUES ('a'") { "a" } else { "c" })
        .collect();
    assert_eq!(inserted_ids, vec!["a", "c"]);
    assert!(warehouse.log[0].ends_with("'a'"));
    assert!(warehouse.log[2].ends_with("'b'"));
    assert!(warehouse.log[3].ends_with("'c'"));
    Ok(())
}

#[tokio::test]
async fn failure_stops_the_pass_and_keeps_earlier_inserts() {
    let mut warehouse = ScriptedWarehouse {
        fail_on: Some("b".to_string()),
        ..ScriptedWarehouse::default()
    };
    let records = [record("a"), record("b"), record("c")];

    let err = sync_records(&mut warehouse, &TableName::default(), &records)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Connection(_)));
    assert_eq!(warehouse.inserts().len(), 1);
    assert!(warehouse.log.iter().all(|sql| !sql.ends_with("'c'")));
}

#[tokio::test]
async fn dry_run_lists_every_statement() -> Result<()> {
    let mut warehouse = DryRunWarehouse::new();
    let table = TableName::new("archive.historical_figures")?;
    let report = sync_records(&mut warehouse, &table, &[record("42"), record("43")]).await?;

    assert_eq!(report.inserted, 2);
    let statements = warehouse.into_statements();
    assert_eq!(statements.len(), 4);
    assert_eq!(
        statements[2],
        "SELECT COUNT(*) FROM archive.historical_figures WHERE ID = '43'"
    );
    Ok(())
}
