pub mod importer;

mod database;
pub use database::postgres::client::{
    DatabaseSettings, DatabaseSettingsError, PostgresClient, PostgresConnectionError,
    PostgresError, PostgresTransaction,
};

mod logger;
pub use logger::{setup_info_logger, setup_logger};
