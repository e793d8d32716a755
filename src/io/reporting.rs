// src/io/reporting.rs

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::model::outcome::AllocationResult;
use crate::model::pool::WarehouseLine;
use crate::model::record::InventoryRecord;

/// Flat CSV row for one allocation result.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationRow<'a> {
    pub store_id: &'a str,
    pub product_id: &'a str,
    pub warehouse_id: &'a str,
    pub category_id: Option<&'a str>,
    pub brand_id: Option<&'a str>,
    pub current_store_stock: f64,
    pub in_transit_units: f64,
    pub weekly_sales_rate: f64,
    pub product_band: Option<&'static str>,
    pub store_band: Option<&'static str>,
    pub stretch: f64,
    pub min_ratio: f64,
    pub rpt_need: f64,
    pub min_need: f64,
    pub need: f64,
    pub need_type: &'static str,
    pub priority: Option<usize>,
    pub shipped_units: f64,
    pub unmet_units: f64,
}

impl<'a> From<&'a AllocationResult> for AllocationRow<'a> {
    fn from(result: &'a AllocationResult) -> Self {
        let nr = &result.need_record;
        let record = &nr.record;
        Self {
            store_id: &record.store_id,
            product_id: &record.product_id,
            warehouse_id: &record.warehouse_id,
            category_id: record.category_id.as_deref(),
            brand_id: record.brand_id.as_deref(),
            current_store_stock: record.current_store_stock,
            in_transit_units: record.in_transit_units,
            weekly_sales_rate: record.weekly_sales_rate,
            product_band: nr.product_band.map(|b| b.label()),
            store_band: nr.store_band.map(|b| b.label()),
            stretch: nr.multipliers.stretch,
            min_ratio: nr.multipliers.min_ratio,
            rpt_need: nr.rpt_need,
            min_need: nr.min_need,
            need: nr.need,
            need_type: nr.need_type.label(),
            priority: result.priority,
            shipped_units: result.shipped_units,
            unmet_units: result.unmet_units,
        }
    }
}

/// Writes allocation results as CSV to any writer.
pub fn write_allocation_results_to<W: Write>(writer: W, results: &[AllocationResult]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for result in results {
        wtr.serialize(AllocationRow::from(result))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes allocation results to a CSV file.
pub fn write_allocation_results(file_path: impl AsRef<Path>, results: &[AllocationResult]) -> Result<()> {
    let path = file_path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    for result in results {
        wtr.serialize(AllocationRow::from(result))?;
    }
    wtr.flush()?;

    info!(rows = results.len(), path = %path.display(), "allocation results exported");
    Ok(())
}

/// Writes inventory records in the layout the snapshot loader reads.
pub fn write_inventory(file_path: impl AsRef<Path>, records: &[InventoryRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(file_path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes warehouse lines in the layout the snapshot loader reads.
pub fn write_warehouse_lines(file_path: impl AsRef<Path>, lines: &[WarehouseLine]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(file_path)?;
    for line in lines {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}
