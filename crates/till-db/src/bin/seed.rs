//! # Catalog Seeder
//!
//! Populates the database with the default product catalog.
//!
//! ## Usage
//! ```bash
//! # Seed missing products into the default database
//! cargo run -p till-db --bin seed
//!
//! # Specify database path
//! cargo run -p till-db --bin seed -- --db ./data/till.db
//!
//! # Administrative reseed: overwrite names/prices for existing codes
//! cargo run -p till-db --bin seed -- --force
//! ```

use std::env;
use std::process::ExitCode;

use tracing::{error, info};

use till_db::{Database, DbConfig, DEFAULT_CATALOG};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = "till.db".to_string();
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" => {
                if i + 1 >= args.len() {
                    error!("--db requires a path argument");
                    return ExitCode::FAILURE;
                }
                db_path = args[i + 1].clone();
                i += 2;
            }
            "--force" => {
                force = true;
                i += 1;
            }
            other => {
                error!(arg = %other, "Unknown argument (expected --db <path> or --force)");
                return ExitCode::FAILURE;
            }
        }
    }

    info!(db = %db_path, force, "Seeding catalog");

    let db = match Database::new(DbConfig::new(&db_path)).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "Failed to open database");
            return ExitCode::FAILURE;
        }
    };

    match db.products().seed_catalog(DEFAULT_CATALOG, force).await {
        Ok(written) => {
            info!(written, "Seed complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Seed failed");
            ExitCode::FAILURE
        }
    }
}
