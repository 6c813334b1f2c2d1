//! Sample run: create the sales schema and record one target and one sale.
//!
//! ```text
//! sales_sqlite [PATH]    # defaults to ./sales.db
//! ```
//!
//! `RUST_LOG` controls log output, e.g. `RUST_LOG=sales_sqlite=debug`.

use anyhow::{Context, Result};
use sales_sqlite::DatabaseInstance;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_DB_PATH: &str = "sales.db";

fn main() -> Result<()> {
    init_tracing();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

    let db = DatabaseInstance::open(&path)
        .with_context(|| format!("failed to open sales database at {path}"))?;
    db.apply_sales_schema().context("failed to create sales schema")?;

    let dsr_id = db.add_dsr("Andrew")?.lastrowid();
    let product_id = db.add_product("Detergent")?.lastrowid();
    db.add_dsr_target(dsr_id, product_id, 20000, "22/03/2021")?;
    db.add_dsr_sales(dsr_id, product_id, 5000, "22/03/2021")?;
    info!(dsr_id, product_id, "recorded sample target and sales");

    db.close().context("failed to close sales database")?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sales_sqlite=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
