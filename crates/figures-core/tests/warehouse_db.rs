use std::env;

use anyhow::Result;
use figures_core::config::{StatementMode, WarehouseConfig};
use figures_core::db;
use figures_core::record::{Record, Year};
use figures_core::sql::TableName;
use figures_core::sync::sync_records;
use figures_core::warehouse::PgWarehouse;
use sqlx::Connection;

const CREATE_TABLE: &str = "(
    ID TEXT PRIMARY KEY,
    NAME TEXT,
    SHORT_DESCRIPTION TEXT,
    GENDER TEXT,
    COUNTRY TEXT,
    OCCUPATION TEXT,
    BIRTH_YEAR INTEGER,
    DEATH_YEAR INTEGER,
    MANNER_OF_DEATH TEXT,
    AGE_OF_DEATH DOUBLE PRECISION,
    CALCULATED_AGE_OF_DEATH INTEGER,
    CENTURY_OF_BIRTH INTEGER
)";

fn sample() -> Vec<Record> {
    let mut obrien = Record::new("Q5593").with_years(Year::new(1911), Year::new(1966));
    obrien.name = Some("Flann O'Brien".to_string());
    obrien.short_description = Some("Irish novelist, playwright and satirist".to_string());
    obrien.age_of_death = Some(55.0);

    let mut unknown = Record::new("Q9000");
    unknown.name = Some("Unknown Person".to_string());

    vec![obrien, unknown]
}

#[tokio::test]
async fn sync_is_insert_only_when_database_available() -> Result<()> {
    let database_url = match env::var("FIGURES_TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping warehouse test because FIGURES_TEST_DATABASE_URL is not set");
            return Ok(());
        }
    };

    let config = WarehouseConfig {
        url: Some(database_url),
        ..WarehouseConfig::default()
    };
    let table_name = format!("historical_figures_test_{}", std::process::id());
    let table = TableName::new(&table_name)?;

    let mut admin = db::connect(&config).await?;
    sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
        .execute(&mut admin)
        .await?;
    sqlx::query(&format!("CREATE TABLE {table} {CREATE_TABLE}"))
        .execute(&mut admin)
        .await?;

    for mode in [StatementMode::Bound, StatementMode::Inline] {
        let mut warehouse = PgWarehouse::connect(&config, mode).await?;
        let report = sync_records(&mut warehouse, &table, &sample()).await?;
        warehouse.close().await?;

        // The first pass inserts, the second finds both rows present.
        let expected_inserts = if mode == StatementMode::Bound { 2 } else { 0 };
        assert_eq!(report.inserted, expected_inserts);
        assert_eq!(report.examined, 2);
    }

    // Rows inserted earlier are never touched by later passes.
    sqlx::query(&format!(
        "UPDATE {table} SET NAME = 'Brian O''Nolan' WHERE ID = 'Q5593'"
    ))
    .execute(&mut admin)
    .await?;
    let mut warehouse = PgWarehouse::connect(&config, StatementMode::Bound).await?;
    sync_records(&mut warehouse, &table, &sample()).await?;
    warehouse.close().await?;

    let (name, description, age, century): (String, String, Option<f64>, Option<i32>) =
        sqlx::query_as(&format!(
            "SELECT NAME, SHORT_DESCRIPTION, AGE_OF_DEATH, CENTURY_OF_BIRTH FROM {table} WHERE ID = 'Q5593'"
        ))
        .fetch_one(&mut admin)
        .await?;
    assert_eq!(name, "Brian O'Nolan");
    assert_eq!(description, "Irish novelist playwright and satirist");
    assert_eq!(age, Some(55.0));
    assert_eq!(century, Some(20));

    let missing_age: Option<f64> = sqlx::query_scalar(&format!(
        "SELECT AGE_OF_DEATH FROM {table} WHERE ID = 'Q9000'"
    ))
    .fetch_one(&mut admin)
    .await?;
    assert_eq!(missing_age, None);

    sqlx::query(&format!("DROP TABLE {table}"))
        .execute(&mut admin)
        .await?;
    admin.close().await?;
    Ok(())
}
