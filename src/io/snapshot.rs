// src/io/snapshot.rs

//! CSV loaders for the inventory and warehouse snapshots.
//!
//! Expected inventory columns:
//!   store_id, product_id, warehouse_id, current_store_stock, in_transit_units,
//!   weekly_sales_rate, min_threshold, max_threshold, target_cover_weeks,
//!   category_id, brand_id
//!
//! Expected warehouse columns:
//!   warehouse_id, product_id, available_units
//!
//! Every row is checked; a file with any bad row is rejected as a whole and the
//! error lists all of them.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::error::{ConfigurationError, FieldIssue, Result};
use crate::model::pool::{RawWarehouseLine, WarehouseLine, WarehouseStock};
use crate::model::record::{InventoryRecord, RawInventoryRecord};

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Loads inventory records from a CSV reader.
pub fn load_inventory<R: Read>(reader: R) -> Result<Vec<InventoryRecord>> {
    let mut csv_reader = csv_reader(reader);
    let mut records = Vec::new();
    let mut issues: Vec<FieldIssue> = Vec::new();

    for (row, result) in csv_reader.deserialize::<RawInventoryRecord>().enumerate() {
        match result?.into_record(row) {
            Ok(record) => records.push(record),
            Err(row_issues) => issues.extend(row_issues),
        }
    }

    if !issues.is_empty() {
        return Err(ConfigurationError::new(issues).into());
    }
    Ok(records)
}

pub fn load_inventory_path(path: impl AsRef<Path>) -> Result<Vec<InventoryRecord>> {
    let path = path.as_ref();
    let records = load_inventory(File::open(path)?)?;
    info!(path = %path.display(), rows = records.len(), "inventory snapshot loaded");
    Ok(records)
}

/// Loads warehouse snapshot lines from a CSV reader.
pub fn load_warehouse_lines<R: Read>(reader: R) -> Result<Vec<WarehouseLine>> {
    let mut csv_reader = csv_reader(reader);
    let mut lines = Vec::new();
    let mut issues: Vec<FieldIssue> = Vec::new();

    for (row, result) in csv_reader.deserialize::<RawWarehouseLine>().enumerate() {
        match result?.into_line(row) {
            Ok(line) => lines.push(line),
            Err(row_issues) => issues.extend(row_issues),
        }
    }

    if !issues.is_empty() {
        return Err(ConfigurationError::new(issues).into());
    }
    Ok(lines)
}

/// Loads a warehouse snapshot straight into a pool.
pub fn load_warehouse_stock<R: Read>(reader: R) -> Result<WarehouseStock> {
    let lines = load_warehouse_lines(reader)?;
    Ok(WarehouseStock::from_lines(lines)?)
}

pub fn load_warehouse_stock_path(path: impl AsRef<Path>) -> Result<WarehouseStock> {
    let path = path.as_ref();
    let pool = load_warehouse_stock(File::open(path)?)?;
    info!(path = %path.display(), keys = pool.len(), "warehouse snapshot loaded");
    Ok(pool)
}
