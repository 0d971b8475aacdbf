pub mod record;
pub mod run;
pub mod source;

pub use record::{CodeRecord, CsvCodeRow};
pub use run::{run_import, CodeStore, CsvImportError, ImportReport, UPSERT_BATCH_SIZE};
pub use source::{CodeCsvSource, OpenCsvError};
