//! Backfill `isActive` on legacy species records.
//!
//! # Usage
//!
//! ```bash
//! DATABASE_URL=mongodb://localhost:27017/pelfish \
//!     cargo run -p pelfish-records-migration --bin migrate-active-records
//! ```
//!
//! Run only while no other process writes to the records collection.
//! Exits 0 on success (including when there is nothing to do), 1 on failure.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, warn};

use pelfish_core::store::MongoStore;
use pelfish_core::tracing::init_tracing;
use pelfish_records_migration::{Outcome, backfill_is_active};

#[derive(Parser)]
#[command(about = "Mark legacy records without isActive as active")]
struct Args {
    /// MongoDB connection URI
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Database to migrate; falls back to DATABASE_NAME, then the URI default
    #[arg(long, env = "MONGODB_DB")]
    database_name: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let database_name = args
        .database_name
        .filter(|name| !name.is_empty())
        .or_else(|| std::env::var("DATABASE_NAME").ok().filter(|n| !n.is_empty()));
    let store = MongoStore::new(args.database_url, database_name);

    warn!("run with no concurrent writers: the backfill takes no lock");

    match backfill_is_active(&store).await {
        Ok(report) => {
            match report.outcome {
                Outcome::NothingToMigrate => println!("No records found. Nothing to migrate."),
                Outcome::AlreadyMigrated => {
                    println!("All records already have isActive. Nothing to update.");
                    println!("Current: {}", report.after);
                }
                Outcome::Backfilled => {
                    println!("Before:  {}", report.before);
                    println!("Updated: {} record(s)", report.updated);
                    println!("After:   {}", report.after);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = ?e, "migration failed");
            eprintln!("{e}: {}", e.source);
            ExitCode::FAILURE
        }
    }
}
