use std::path::Path;

use async_trait::async_trait;
use tracing::{error, info};

use crate::{
    database::postgres::client::{PostgresClient, PostgresError, ToSql},
    importer::{
        record::{CodeRecord, UPDATED_BY},
        source::{CodeCsvSource, OpenCsvError},
    },
};

/// Records are flushed to the database in groups of exactly this size,
/// one transaction per group. The tail of the file goes out as a smaller
/// final batch.
pub const UPSERT_BATCH_SIZE: usize = 100;

/// Bind parameters per row - `updated_at` is not one of them, it is the
/// server-side `NOW()` inlined into every tuple.
const UPSERT_COLUMNS: usize = 6;

#[derive(thiserror::Error, Debug)]
pub enum CsvImportError {
    #[error("{0}")]
    OpenCsv(#[from] OpenCsvError),

    #[error("Csv row could not be read, check the file has all the expected columns: {0}")]
    MalformedCsvRow(#[from] csv::Error),
}

/// Outcome of a full run. `upserted` only counts rows from committed
/// batches, a failed batch drops all of its rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportReport {
    pub upserted: u64,
    pub failed_batches: u64,
}

/// Seam between the batching loop and the storage backend. Each call is one
/// atomic flush: either every record in the batch is persisted or none are.
#[async_trait]
pub trait CodeStore {
    type Error: std::fmt::Display + Send;

    async fn upsert_codes(&mut self, batch: &[CodeRecord]) -> Result<u64, Self::Error>;
}

/// Builds the multi-row upsert for `rows` records. The incoming row always
/// wins over whatever is already stored under the same code.
fn codes_upsert_sql(rows: usize) -> String {
    let mut query = String::from(
        "INSERT INTO codes (code, description, category, active, custom_fields, updated_at, updated_by) VALUES ",
    );

    for i in 0..rows {
        if i > 0 {
            query.push(',');
        }
        let base = i * UPSERT_COLUMNS;
        query.push_str(&format!(
            "(${},${},${},${},${},NOW(),${})",
            base + 1,
            base + 2,
            base + 3,
            base + 4,
            base + 5,
            base + 6
        ));
    }

    query.push_str(
        " ON CONFLICT (code) DO UPDATE SET \
         description = EXCLUDED.description, \
         category = EXCLUDED.category, \
         active = EXCLUDED.active, \
         custom_fields = EXCLUDED.custom_fields, \
         updated_at = EXCLUDED.updated_at, \
         updated_by = EXCLUDED.updated_by",
    );

    query
}

#[async_trait]
impl CodeStore for PostgresClient {
    type Error = PostgresError;

    async fn upsert_codes(&mut self, batch: &[CodeRecord]) -> Result<u64, PostgresError> {
        let query = codes_upsert_sql(batch.len());

        let mut params: Vec<&(dyn ToSql + Sync)> =
            Vec::with_capacity(batch.len() * UPSERT_COLUMNS);
        for record in batch {
            params.push(&record.code);
            params.push(&record.description);
            params.push(&record.category);
            params.push(&record.active);
            params.push(&record.custom_fields);
            params.push(&UPDATED_BY);
        }

        let mut transaction = self.transaction().await?;
        match transaction.execute(&query, &params).await {
            Ok(count) => {
                transaction.commit().await?;
                Ok(count)
            }
            Err(e) => {
                transaction.rollback().await?;
                Err(e)
            }
        }
    }
}

/// Streams the csv at `csv_path` into the store in batches of
/// [`UPSERT_BATCH_SIZE`], committing per batch.
///
/// A batch that the store rejects is rolled back and logged, its records are
/// dropped and the run moves on to the next rows. Setup problems - an
/// unreadable file or a row missing one of the expected columns - abort the
/// whole run instead.
pub async fn run_import<S: CodeStore>(
    csv_path: &Path,
    store: &mut S,
) -> Result<ImportReport, CsvImportError> {
    info!("Starting RAMQ code import from {}", csv_path.display());

    let source = CodeCsvSource::open(csv_path)?;

    let mut report = ImportReport::default();
    let mut batch: Vec<CodeRecord> = Vec::with_capacity(UPSERT_BATCH_SIZE);

    for row in source {
        let row = row?;
        batch.push(CodeRecord::from_csv_row(&row));

        if batch.len() >= UPSERT_BATCH_SIZE {
            flush_batch(store, &batch, &mut report).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        flush_batch(store, &batch, &mut report).await;
    }

    info!("Import completed, upserted {} code records", report.upserted);

    Ok(report)
}

async fn flush_batch<S: CodeStore>(
    store: &mut S,
    batch: &[CodeRecord],
    report: &mut ImportReport,
) {
    match store.upsert_codes(batch).await {
        Ok(count) => {
            report.upserted += count;
            info!("Inserted batch: {} records", report.upserted);
        }
        Err(e) => {
            report.failed_batches += 1;
            error!("Error inserting batch: {}", e);
        }
    }
}
