//! Insert helpers for the sales tables.
//!
//! None of these check that referenced DSR or product rows exist; that is
//! left to the engine, which only enforces it when the instance was opened
//! with foreign keys enabled.

use crate::error::Result;
use crate::schema::SALES_SCHEMA;
use crate::sqlite::{Cursor, DatabaseInstance, Params};

impl DatabaseInstance {
    /// Drop and recreate the four sales tables.
    pub fn apply_sales_schema(&self) -> Result<Cursor> {
        self.execute_script(SALES_SCHEMA)
    }

    /// Insert a sales representative. `dsr_id` is assigned by the engine and
    /// available as [`Cursor::lastrowid`].
    pub fn add_dsr(&self, dsr_name: &str) -> Result<Cursor> {
        self.execute("INSERT INTO dsr (dsr_name) VALUES (?)", [dsr_name])
    }

    pub fn add_product(&self, product_name: &str) -> Result<Cursor> {
        self.execute("INSERT INTO products (product_name) VALUES (?)", [product_name])
    }

    pub fn add_dsr_target(
        &self,
        dsr_id: i64,
        product_id: i64,
        dsr_target: i64,
        date: &str,
    ) -> Result<Cursor> {
        self.execute(
            "INSERT INTO dsr_targets (dsr_id, product_id, dsr_target, date) VALUES (?, ?, ?, ?)",
            Params::new()
                .with_value(dsr_id)
                .with_value(product_id)
                .with_value(dsr_target)
                .with_value(date),
        )
    }

    pub fn add_dsr_sales(
        &self,
        dsr_id: i64,
        product_id: i64,
        sales: i64,
        date: &str,
    ) -> Result<Cursor> {
        self.execute(
            "INSERT INTO dsr_sales (dsr_id, product_id, sales, date) VALUES (?, ?, ?, ?)",
            Params::new()
                .with_value(dsr_id)
                .with_value(product_id)
                .with_value(sales)
                .with_value(date),
        )
    }
}
