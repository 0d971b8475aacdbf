use std::{path::PathBuf, process};

use clap::{Parser, Subcommand};
use colored::Colorize;
use ramq_import::{
    importer::run_import, setup_info_logger, DatabaseSettings, PostgresClient,
};

#[derive(Parser, Debug)]
#[clap(name = "ramq_import", about, version)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reads the RAMQ csv export and upserts every billing code into the
    /// codes table.
    ///
    /// The database connection is taken from the DATABASE_URL environment
    /// variable (a .env file in the working directory is picked up too).
    ///
    /// Example:
    /// `ramq_import run --csv attached_assets/ramq_codes.csv`
    Run {
        #[clap(
            short,
            long,
            help = "Path to the RAMQ csv export",
            default_value = "attached_assets/ramq_codes.csv"
        )]
        csv: PathBuf,
    },
}

fn print_error_message(error_message: &str) {
    println!("{}", error_message.red());
}

fn print_success_message(success_message: &str) {
    println!("{}", success_message.green());
}

#[tokio::main]
async fn main() {
    setup_info_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { csv } => {
            let settings = match DatabaseSettings::from_env() {
                Ok(settings) => settings,
                Err(e) => {
                    print_error_message(&format!("Database connection config is invalid: {}", e));
                    process::exit(1);
                }
            };

            let mut client = match PostgresClient::new(&settings).await {
                Ok(client) => client,
                Err(e) => {
                    print_error_message(&format!("Could not connect to the database: {}", e));
                    process::exit(1);
                }
            };

            match run_import(&csv, &mut client).await {
                Ok(report) => {
                    if report.failed_batches > 0 {
                        print_error_message(&format!(
                            "{} batch(es) failed and were rolled back, their records were not imported",
                            report.failed_batches
                        ));
                    }
                    print_success_message(&format!(
                        "Import completed! Inserted {} code records",
                        report.upserted
                    ));
                }
                Err(e) => {
                    print_error_message(&format!("Import failed: {}", e));
                    process::exit(1);
                }
            }
        }
    }
}
