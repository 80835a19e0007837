// crates/figures-core/src/sync.rs

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::record::Record;
use crate::sql::{existence_query, insert_statement, TableName};
use crate::warehouse::Warehouse;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub examined: usize,
    pub inserted: usize,
    pub skipped: usize,
}

/// Inserts every record whose ID the warehouse does not hold yet.
///
/// Records are handled one at a time in slice order: an existence check, then an
/// INSERT only when the count is zero. Existing rows are left untouched. The first
/// error stops the pass; rows inserted before it stay inserted.
pub async fn sync_records<W>(
    warehouse: &mut W,
    table: &TableName,
    records: &[Record],
) -> Result<SyncReport>
where
    W: Warehouse + ?Sized,
{
    let mut report = SyncReport::default();

    for record in records {
        report.examined += 1;

        let existing = warehouse.count(&existence_query(table, &record.id)).await?;
        if existing != 0 {
            debug!(id = %record.id, existing, "Record already present, skipping");
            report.skipped += 1;
            continue;
        }

        warehouse.execute(&insert_statement(table, record)).await?;
        debug!(id = %record.id, "Inserted record");
        report.inserted += 1;
    }

    info!(
        table = %table,
        examined = report.examined,
        inserted = report.inserted,
        skipped = report.skipped,
        "Synchronization finished"
    );
    Ok(report)
}
