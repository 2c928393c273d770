//! # Seed Data Generator
//!
//! Populates a ledger with demo stock for two branches, then runs one sale
//! and one transfer through the engine and prints the reconciliation.
//!
//! ## Usage
//! ```bash
//! # Use ledger.toml from the platform config dir (or defaults)
//! cargo run -p agro-db --bin seed
//!
//! # Specify database path
//! cargo run -p agro-db --bin seed -- --db ./data/agro.db
//!
//! # Specify config file
//! cargo run -p agro-db --bin seed -- --config ./ledger.toml
//! ```
//!
//! ## Generated Stock
//! - `UREA-25` fertilizer in 25 kg sacks, two lots at SUC-01
//! - `GLIFO-20L` herbicide in 20 L drums, base unit litres
//! - `SEM-MAIZ` seed corn, FIFO-costed
//!
//! Lot codes are fixed, so running the seeder twice adds to the same lots.

use agro_core::quantity::base_quantity_for;
use agro_core::{
    CostingMethod, Money, Quantity, ReceiveStockRequest, SaleLineRequest, SaleRequest, SaleStatus,
    TransferRequest, ORIGIN_POS,
};
use agro_db::{Database, Ledger, LedgerConfig};
use chrono::{Duration, Utc};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// (product, branch, lot code, days ago received, quantity, unit cost in cents, costing)
const RECEIPTS: &[(&str, &str, &str, i64, &str, i64, CostingMethod)] = &[
    ("UREA-25", "SUC-01", "U-2401", 30, "40", 41_500, CostingMethod::Average),
    ("UREA-25", "SUC-01", "U-2402", 10, "25", 43_000, CostingMethod::Average),
    ("GLIFO-20L", "SUC-01", "G-0307", 20, "200", 9_800, CostingMethod::Average),
    ("SEM-MAIZ", "SUC-01", "M-24", 15, "60", 128_000, CostingMethod::Fifo),
    ("SEM-MAIZ", "SUC-02", "M-23", 40, "12", 119_000, CostingMethod::Fifo),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<String> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Agro Ledger Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (overrides config)");
                println!("  -c, --config <PATH>  ledger.toml path");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = LedgerConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = PathBuf::from(path);
    }

    println!("🌱 Agro Ledger Seed Data Generator");
    println!("==================================");
    println!("Database: {}", config.database.path.display());
    println!();

    let db = Database::new(config.db_config()).await?;
    let ledger = Ledger::new(db, &config);
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Receipts
    println!();
    println!("Receiving stock...");
    let now = Utc::now();
    for (product, branch, code, days_ago, qty, cost, costing) in RECEIPTS {
        let change = ledger
            .receive_stock(ReceiveStockRequest {
                product_id: product.to_string(),
                branch_id: branch.to_string(),
                quantity: qty.parse()?,
                lot_code: Some(code.to_string()),
                unit_cost: Some(Money::from_cents(*cost)),
                costing_method: Some(*costing),
                received_at: Some(now - Duration::days(*days_ago)),
                location: None,
                reference: format!("OC-SEED-{code}"),
                origin_module: Some("SEED".to_string()),
            })
            .await?;
        println!(
            "  {} {} lot {} → {}",
            branch, product, code, change.lot.quantity
        );
    }

    // One ticket that spans both urea lots, plus two 20 L drums sold by the litre
    let drums = Quantity::from_units(2);
    let drum_litres = base_quantity_for(drums, Quantity::from_units(20), config.ledger.residual_tolerance);
    println!();
    println!("Fulfilling demo sale...");
    let sale = ledger
        .fulfill_sale(SaleRequest {
            folio: format!("DEMO-{}", now.format("%Y%m%d%H%M%S")),
            branch_id: "SUC-01".to_string(),
            status: SaleStatus::Completed,
            subtotal: Money::from_cents(45 * 52_000 + 40 * 1_350),
            tax: Money::zero(),
            total: Money::from_cents(45 * 52_000 + 40 * 1_350),
            origin_module: Some(ORIGIN_POS.to_string()),
            notes: Some("seed demo".to_string()),
            items: vec![
                SaleLineRequest {
                    product_id: "UREA-25".to_string(),
                    quantity: Quantity::from_units(45),
                    base_quantity: None,
                    unit: Some("sack".to_string()),
                    unit_price: Money::from_cents(52_000),
                },
                SaleLineRequest {
                    product_id: "GLIFO-20L".to_string(),
                    quantity: drums,
                    base_quantity: Some(drum_litres),
                    unit: Some("drum".to_string()),
                    unit_price: Money::from_cents(20 * 1_350),
                },
            ],
        })
        .await;

    match sale {
        Ok(done) => {
            for line in &done.lines {
                println!(
                    "  line {} {}: {} from {} lot(s), cost {}",
                    line.line_no,
                    line.product_id,
                    line.deducted(),
                    line.allocations.len(),
                    line.cost_of_goods()
                );
            }
        }
        // A rerun may have sold the older lots down already
        Err(e) => println!("⚠ Sale skipped: {} ({})", e, e.kind()),
    }

    println!();
    println!("Transferring seed corn SUC-01 → SUC-02...");
    let outcome = ledger
        .transfer(TransferRequest {
            product_id: "SEM-MAIZ".to_string(),
            source_branch_id: "SUC-01".to_string(),
            dest_branch_id: "SUC-02".to_string(),
            quantity: Quantity::from_units(10),
            source_lot_id: None,
            lot_code: Some("M-24".to_string()),
            dest_lot_code: None,
            unit_cost: None,
            costing_method: None,
            reference: Some("seed demo".to_string()),
        })
        .await?;
    println!(
        "  {} ({}), destination lot {}",
        outcome.reference,
        if outcome.dest_lot_created { "new lot" } else { "existing lot" },
        outcome.dest_lot.quantity
    );

    // Reconciliation
    println!();
    println!("Reconciling...");
    let report = ledger.reconcile_all(None, None).await?;
    let unbalanced = report.iter().filter(|r| !r.balanced).count();
    for r in &report {
        println!(
            "  {} {:<10} {:<8} recorded {:>8}  derived {:>8}  {}",
            if r.balanced { "✓" } else { "✗" },
            r.product_id,
            r.branch_id,
            r.recorded,
            r.derived,
            r.movement_count
        );
    }

    println!();
    if unbalanced == 0 {
        println!("✓ {} lots balanced", report.len());
    } else {
        println!("✗ {} of {} lots do not match their movements", unbalanced, report.len());
    }

    ledger.database().close().await;
    Ok(())
}

/// `RUST_LOG` wins; otherwise info, with debug for this crate.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,agro_db=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
