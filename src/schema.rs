//! Sales schema.
//!
//! The script drops and recreates every table, so running it discards all
//! previously stored rows.
//!
//! Known issue: the foreign keys declare `ON UPDATE SET NULL ON DELETE SET NULL`
//! on columns that are also `NOT NULL`. With `PRAGMA foreign_keys = ON`, deleting
//! or re-keying a referenced row therefore fails with a NOT NULL constraint
//! error instead of nullifying the reference. The same applies to rerunning
//! this script on a populated database with enforcement on: `DROP TABLE dsr`
//! deletes its rows first, so the script fails and the data stays in place.
//! The declarations are kept as they are so existing databases stay compatible.

/// Tables created by [`SALES_SCHEMA`], in creation order.
pub const SALES_TABLES: [&str; 4] = ["dsr", "products", "dsr_targets", "dsr_sales"];

pub const SALES_SCHEMA: &str = r#"
DROP TABLE IF EXISTS dsr;
DROP TABLE IF EXISTS products;
DROP TABLE IF EXISTS dsr_targets;
DROP TABLE IF EXISTS dsr_sales;

CREATE TABLE dsr (dsr_id integer PRIMARY KEY, dsr_name text NOT NULL);
CREATE TABLE products (product_id integer PRIMARY KEY, product_name text NOT NULL);
CREATE TABLE dsr_targets (
  dsr_id integer NOT NULL, product_id integer NOT NULL,
  dsr_target integer NOT NULL, date text NOT NULL,
  FOREIGN KEY (dsr_id) REFERENCES dsr(dsr_id) ON UPDATE SET NULL ON DELETE SET NULL,
  FOREIGN KEY (product_id) REFERENCES products(product_id) ON UPDATE SET NULL ON DELETE SET NULL
);
CREATE TABLE dsr_sales (
  dsr_id integer NOT NULL, product_id integer NOT NULL,
  sales integer NOT NULL, date text NOT NULL,
  FOREIGN KEY (dsr_id) REFERENCES dsr(dsr_id) ON UPDATE SET NULL ON DELETE SET NULL,
  FOREIGN KEY (product_id) REFERENCES products(product_id) ON UPDATE SET NULL ON DELETE SET NULL
);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mentions_every_table() {
        for table in SALES_TABLES {
            assert!(SALES_SCHEMA.contains(&format!("DROP TABLE IF EXISTS {table};")));
            assert!(SALES_SCHEMA.contains(&format!("CREATE TABLE {table} (")));
        }
    }
}
