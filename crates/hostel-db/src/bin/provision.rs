//! # Unit Pool Provisioner
//!
//! Creates (or inspects) the unit pool in the configured store.
//!
//! ## Usage
//! ```bash
//! # Provision the configured pool (5 units by default)
//! cargo run -p hostel-db --bin provision
//!
//! # Custom size and backend
//! cargo run -p hostel-db --bin provision -- --count 8 --store sqlite --path ./data/units.db
//!
//! # Throw away the existing pool and start over
//! cargo run -p hostel-db --bin provision -- --count 8 --force
//! ```
//!
//! An existing pool is never touched without `--force`; the tool just
//! prints what is there.

use std::path::PathBuf;

use clap::Parser;
use hostel_core::ledger::provision;
use hostel_core::{UnitRecord, UnitStatus};
use hostel_db::{CheckoutLedger, LedgerConfig, StoreBackend};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "provision", about = "Provision the hostel unit pool")]
struct Args {
    /// Number of units (default: from config, 5)
    #[arg(short, long)]
    count: Option<u32>,

    /// Store backend: json, sqlite or memory
    #[arg(short, long)]
    store: Option<StoreBackend>,

    /// Store file path
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Config file (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replace an existing pool with a fresh one
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hostel=debug,sqlx=warn")),
        )
        .init();

    let args = Args::parse();

    let mut config = LedgerConfig::load(args.config)?;
    if let Some(count) = args.count {
        config.unit_count = count;
    }
    if let Some(backend) = args.store {
        config.store.backend = backend;
    }
    if let Some(path) = args.path {
        config.store.path = Some(path);
    }
    config.validate()?;

    println!("Hostel Unit Provisioner");
    println!("=======================");
    println!("Store:   {} ({})", config.store.backend, config.store.resolved_path().display());
    println!("Units:   {}", config.unit_count);
    println!();

    let store = config.store.open().await?;

    if args.force {
        let records: Vec<UnitRecord> = provision(config.unit_count)
            .iter()
            .map(UnitRecord::from)
            .collect();
        store.save(&records).await?;
        println!("Replaced pool with {} available units", records.len());
    }

    let ledger = CheckoutLedger::open(store, config.ledger_options()).await?;
    if !args.force && ledger.unit_count() != config.unit_count as usize {
        println!(
            "Store already holds {} units; pass --force to replace them",
            ledger.unit_count()
        );
    }

    let inventory = ledger.inventory(None).await;
    println!();
    println!(
        "Total: {}  Available: {}  Checked out: {}",
        inventory.summary.total, inventory.summary.available_count, inventory.summary.checked_out_count
    );
    for unit in &inventory.units {
        match unit.status {
            UnitStatus::Available => println!("  #{:<4} available", unit.unit_id),
            UnitStatus::CheckedOut => println!(
                "  #{:<4} checked out by {} ({}), due {}",
                unit.unit_id,
                unit.holder.as_deref().unwrap_or_default(),
                unit.location.as_deref().unwrap_or_default(),
                unit.due_at.map(|d| d.to_rfc3339()).unwrap_or_default(),
            ),
        }
    }

    Ok(())
}
