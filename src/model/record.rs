// src/model/record.rs

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, FieldIssue};

/// One store/product line of the inventory snapshot.
///
/// Records are produced once per reporting cycle and never mutated by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    // Identity
    pub store_id: String,
    pub product_id: String,
    pub warehouse_id: String, // Warehouse that replenishes this store

    // Stock position (units)
    pub current_store_stock: f64,
    pub in_transit_units: f64,
    pub weekly_sales_rate: f64,

    // Stocking policy
    pub min_threshold: f64,
    pub max_threshold: f64,
    pub target_cover_weeks: f64,

    // Optional attributes used by run filters
    pub category_id: Option<String>,
    pub brand_id: Option<String>,
}

impl InventoryRecord {
    /// A record with an empty stock position and zero thresholds.
    pub fn new(
        store_id: impl Into<String>,
        product_id: impl Into<String>,
        warehouse_id: impl Into<String>,
    ) -> Self {
        Self {
            store_id: store_id.into(),
            product_id: product_id.into(),
            warehouse_id: warehouse_id.into(),
            current_store_stock: 0.0,
            in_transit_units: 0.0,
            weekly_sales_rate: 0.0,
            min_threshold: 0.0,
            max_threshold: 0.0,
            target_cover_weeks: 0.0,
            category_id: None,
            brand_id: None,
        }
    }

    pub fn with_stock(mut self, current_store_stock: f64, in_transit_units: f64) -> Self {
        self.current_store_stock = current_store_stock;
        self.in_transit_units = in_transit_units;
        self
    }

    pub fn with_sales_rate(mut self, weekly_sales_rate: f64) -> Self {
        self.weekly_sales_rate = weekly_sales_rate;
        self
    }

    pub fn with_thresholds(mut self, min_threshold: f64, max_threshold: f64) -> Self {
        self.min_threshold = min_threshold;
        self.max_threshold = max_threshold;
        self
    }

    pub fn with_target_cover(mut self, target_cover_weeks: f64) -> Self {
        self.target_cover_weeks = target_cover_weeks;
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_brand(mut self, brand_id: impl Into<String>) -> Self {
        self.brand_id = Some(brand_id.into());
        self
    }

    /// Stock already in the store plus stock on its way there.
    pub fn stock_position(&self) -> f64 {
        self.current_store_stock + self.in_transit_units
    }

    /// Checks field constraints. Returns every violation, not just the first.
    pub fn check(&self, row: usize) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        let identity = |issue: FieldIssue| {
            issue.with_identity(non_blank(&self.store_id), non_blank(&self.product_id))
        };

        for (field, value) in [
            ("store_id", &self.store_id),
            ("product_id", &self.product_id),
            ("warehouse_id", &self.warehouse_id),
        ] {
            if value.trim().is_empty() {
                issues.push(identity(FieldIssue::new(row, field, "is missing")));
            }
        }

        for (field, value) in self.quantities() {
            if let Some(reason) = quantity_problem(value) {
                issues.push(identity(FieldIssue::new(row, field, reason)));
            }
        }

        issues
    }

    fn quantities(&self) -> [(&'static str, f64); 6] {
        [
            ("current_store_stock", self.current_store_stock),
            ("in_transit_units", self.in_transit_units),
            ("weekly_sales_rate", self.weekly_sales_rate),
            ("min_threshold", self.min_threshold),
            ("max_threshold", self.max_threshold),
            ("target_cover_weeks", self.target_cover_weeks),
        ]
    }
}

/// Validates a whole batch in one pass.
pub fn validate_records(records: &[InventoryRecord]) -> Result<(), ConfigurationError> {
    let issues: Vec<FieldIssue> = records
        .iter()
        .enumerate()
        .flat_map(|(row, record)| record.check(row))
        .collect();

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ConfigurationError::new(issues))
    }
}

/// An inventory row as it arrives from a file: every column optional and untyped.
///
/// Converting it with [`RawInventoryRecord::into_record`] is the only way a raw
/// row becomes an [`InventoryRecord`]; absent required columns are reported,
/// never defaulted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInventoryRecord {
    pub store_id: Option<String>,
    pub product_id: Option<String>,
    pub warehouse_id: Option<String>,
    pub current_store_stock: Option<String>,
    pub in_transit_units: Option<String>,
    pub weekly_sales_rate: Option<String>,
    pub min_threshold: Option<String>,
    pub max_threshold: Option<String>,
    pub target_cover_weeks: Option<String>,
    pub category_id: Option<String>,
    pub brand_id: Option<String>,
}

impl RawInventoryRecord {
    pub fn into_record(self, row: usize) -> Result<InventoryRecord, Vec<FieldIssue>> {
        let mut issues = Vec::new();
        let store = non_blank_owned(self.store_id);
        let product = non_blank_owned(self.product_id);
        let warehouse = non_blank_owned(self.warehouse_id);

        {
            let mut report = |field: &'static str, reason: String| {
                issues.push(
                    FieldIssue::new(row, field, reason)
                        .with_identity(store.as_deref(), product.as_deref()),
                );
            };
            if store.is_none() {
                report("store_id", "is missing".into());
            }
            if product.is_none() {
                report("product_id", "is missing".into());
            }
            if warehouse.is_none() {
                report("warehouse_id", "is missing".into());
            }
        }

        let mut quantity = |field: &'static str, raw: Option<String>| -> f64 {
            match parse_quantity(raw) {
                Ok(value) => value,
                Err(reason) => {
                    issues.push(
                        FieldIssue::new(row, field, reason)
                            .with_identity(store.as_deref(), product.as_deref()),
                    );
                    0.0
                }
            }
        };

        let current_store_stock = quantity("current_store_stock", self.current_store_stock);
        let in_transit_units = quantity("in_transit_units", self.in_transit_units);
        let weekly_sales_rate = quantity("weekly_sales_rate", self.weekly_sales_rate);
        let min_threshold = quantity("min_threshold", self.min_threshold);
        let max_threshold = quantity("max_threshold", self.max_threshold);
        let target_cover_weeks = quantity("target_cover_weeks", self.target_cover_weeks);

        match (store, product, warehouse) {
            (Some(store_id), Some(product_id), Some(warehouse_id)) if issues.is_empty() => {
                Ok(InventoryRecord {
                    store_id,
                    product_id,
                    warehouse_id,
                    current_store_stock,
                    in_transit_units,
                    weekly_sales_rate,
                    min_threshold,
                    max_threshold,
                    target_cover_weeks,
                    category_id: non_blank_owned(self.category_id),
                    brand_id: non_blank_owned(self.brand_id),
                })
            }
            _ => Err(issues),
        }
    }
}

/// Parses a required, non-negative, finite quantity column.
pub(crate) fn parse_quantity(raw: Option<String>) -> Result<f64, String> {
    let text = match raw.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return Err("is missing".into()),
    };
    let value: f64 = text
        .parse()
        .map_err(|_| format!("is not a number: {text:?}"))?;
    match quantity_problem(value) {
        Some(reason) => Err(reason),
        None => Ok(value),
    }
}

fn quantity_problem(value: f64) -> Option<String> {
    if !value.is_finite() {
        Some(format!("must be a finite number, got {value}"))
    } else if value < 0.0 {
        Some(format!("must be >= 0, got {value}"))
    } else {
        None
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

pub(crate) fn non_blank_owned(value: Option<String>) -> Option<String> {
    value.and_then(|v| non_blank(&v).map(str::to_owned))
}
