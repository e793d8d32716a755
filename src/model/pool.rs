// src/model/pool.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{self, ConfigurationError, FieldIssue, ReplenishmentError};
use crate::model::record::{non_blank_owned, parse_quantity};
use crate::model::units::floor_units;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StockKey {
    pub warehouse_id: String,
    pub product_id: String,
}

impl StockKey {
    pub fn new(warehouse_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            warehouse_id: warehouse_id.into(),
            product_id: product_id.into(),
        }
    }
}

/// One line of the warehouse snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseLine {
    pub warehouse_id: String,
    pub product_id: String,
    pub available_units: f64,
}

/// Warehouse snapshot row as read from a file, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWarehouseLine {
    pub warehouse_id: Option<String>,
    pub product_id: Option<String>,
    pub available_units: Option<String>,
}

impl RawWarehouseLine {
    pub fn into_line(self, row: usize) -> Result<WarehouseLine, Vec<FieldIssue>> {
        let mut issues = Vec::new();
        let warehouse = non_blank_owned(self.warehouse_id);
        let product = non_blank_owned(self.product_id);

        if warehouse.is_none() {
            issues.push(FieldIssue::new(row, "warehouse_id", "is missing"));
        }
        if product.is_none() {
            issues.push(FieldIssue::new(row, "product_id", "is missing"));
        }
        let available = match parse_quantity(self.available_units) {
            Ok(v) => Some(v),
            Err(reason) => {
                issues.push(
                    FieldIssue::new(row, "available_units", reason)
                        .with_identity(None, product.as_deref()),
                );
                None
            }
        };

        match (warehouse, product, available) {
            (Some(warehouse_id), Some(product_id), Some(available_units)) => Ok(WarehouseLine {
                warehouse_id,
                product_id,
                available_units,
            }),
            _ => Err(issues),
        }
    }
}

/// The finite pool of warehouse stock consumed by one allocation run.
///
/// A pool is moved into the run that consumes it. Callers that need to run
/// twice over the same snapshot clone it first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarehouseStock {
    lines: BTreeMap<StockKey, f64>,
}

impl WarehouseStock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pool from snapshot lines. Lines sharing a key are summed.
    pub fn from_lines<I>(lines: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = WarehouseLine>,
    {
        let mut pool = Self::new();
        let mut issues = Vec::new();

        for (row, line) in lines.into_iter().enumerate() {
            let mut line_issues = Vec::new();
            if line.warehouse_id.trim().is_empty() {
                line_issues.push(FieldIssue::new(row, "warehouse_id", "is missing"));
            }
            if line.product_id.trim().is_empty() {
                line_issues.push(FieldIssue::new(row, "product_id", "is missing"));
            }
            if !line.available_units.is_finite() || line.available_units < 0.0 {
                line_issues.push(
                    FieldIssue::new(
                        row,
                        "available_units",
                        format!("must be a finite number >= 0, got {}", line.available_units),
                    )
                    .with_identity(None, Some(line.product_id.as_str())),
                );
            }

            if line_issues.is_empty() {
                pool.insert(
                    StockKey::new(line.warehouse_id, line.product_id),
                    line.available_units,
                );
            } else {
                issues.extend(line_issues);
            }
        }

        if issues.is_empty() {
            Ok(pool)
        } else {
            Err(ConfigurationError::new(issues))
        }
    }

    /// Adds units to a key, keeping whole units only.
    ///
    /// Negative or non-finite amounts are rejected and leave the pool unchanged.
    pub fn add(
        &mut self,
        warehouse_id: impl Into<String>,
        product_id: impl Into<String>,
        units: f64,
    ) -> error::Result<()> {
        let key = StockKey::new(warehouse_id, product_id);
        if !units.is_finite() || units < 0.0 {
            return Err(ReplenishmentError::invalid_parameter(
                "available_units",
                format!(
                    "must be a finite number >= 0, got {units} for warehouse {} product {}",
                    key.warehouse_id, key.product_id
                ),
            ));
        }
        self.insert(key, units);
        Ok(())
    }

    fn insert(&mut self, key: StockKey, units: f64) {
        *self.lines.entry(key).or_insert(0.0) += floor_units(units);
    }

    /// Units left for a key; an unknown key has none.
    pub fn available(&self, warehouse_id: &str, product_id: &str) -> f64 {
        self.lines
            .get(&StockKey::new(warehouse_id, product_id))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn contains(&self, warehouse_id: &str, product_id: &str) -> bool {
        self.lines
            .contains_key(&StockKey::new(warehouse_id, product_id))
    }

    /// Removes up to `requested` units from a key and returns what was taken.
    ///
    /// The pool never goes below zero and unknown keys yield nothing.
    pub fn take(&mut self, warehouse_id: &str, product_id: &str, requested: f64) -> f64 {
        if requested <= 0.0 {
            return 0.0;
        }
        match self.lines.get_mut(&StockKey::new(warehouse_id, product_id)) {
            Some(available) => {
                let taken = requested.min(*available);
                *available -= taken;
                taken
            }
            None => 0.0,
        }
    }

    /// Units of a product across every warehouse.
    pub fn available_for_product(&self, product_id: &str) -> f64 {
        self.lines
            .iter()
            .filter(|(key, _)| key.product_id == product_id)
            .map(|(_, units)| units)
            .sum()
    }

    pub fn total_available(&self) -> f64 {
        self.lines.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StockKey, f64)> {
        self.lines.iter().map(|(key, units)| (key, *units))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(w: &str, p: &str, units: f64) -> WarehouseLine {
        WarehouseLine {
            warehouse_id: w.into(),
            product_id: p.into(),
            available_units: units,
        }
    }

    #[test]
    fn take_ships_what_is_there_and_depletes() {
        let mut pool = WarehouseStock::new();
        pool.add("W1", "P1", 60.0).unwrap();

        assert_eq!(pool.take("W1", "P1", 50.0), 50.0);
        assert_eq!(pool.available("W1", "P1"), 10.0);
        assert_eq!(pool.take("W1", "P1", 30.0), 10.0);
        assert_eq!(pool.available("W1", "P1"), 0.0);
        assert_eq!(pool.take("W1", "P1", 5.0), 0.0);
    }

    #[test]
    fn unknown_key_has_nothing_to_give() {
        let mut pool = WarehouseStock::new();
        assert_eq!(pool.available("W9", "P1"), 0.0);
        assert_eq!(pool.take("W9", "P1", 12.0), 0.0);
        assert!(!pool.contains("W9", "P1"));
        assert!(pool.is_empty());
    }

    #[test]
    fn duplicate_snapshot_lines_are_summed() {
        let pool = WarehouseStock::from_lines(vec![
            line("W1", "P1", 10.0),
            line("W1", "P1", 5.0),
            line("W2", "P1", 7.0),
        ])
        .unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.available("W1", "P1"), 15.0);
        assert_eq!(pool.available_for_product("P1"), 22.0);
        assert_eq!(pool.total_available(), 22.0);
    }

    #[test]
    fn invalid_snapshot_lines_are_rejected() {
        let err = WarehouseStock::from_lines(vec![
            line("W1", "P1", -3.0),
            line("", "P2", 4.0),
            line("W1", "P3", f64::INFINITY),
        ])
        .unwrap_err();
        let fields: Vec<_> = err.issues.iter().map(|i| (i.row, i.field)).collect();
        assert_eq!(
            fields,
            vec![(0, "available_units"), (1, "warehouse_id"), (2, "available_units")]
        );
    }

    #[test]
    fn raw_line_requires_every_column() {
        let raw = RawWarehouseLine {
            warehouse_id: Some("W1".into()),
            product_id: None,
            available_units: Some("x".into()),
        };
        let issues = raw.into_line(3).unwrap_err();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].field, "product_id");
        assert_eq!(issues[1].field, "available_units");
    }

    #[test]
    fn bad_amounts_are_rejected_not_dropped() {
        let mut pool = WarehouseStock::new();
        let err = pool.add("W1", "P1", -5.0).unwrap_err();
        assert!(matches!(
            err,
            ReplenishmentError::InvalidParameter { name: "available_units", .. }
        ));
        assert!(err.to_string().contains("warehouse W1 product P1"));
        assert!(pool.add("W1", "P1", f64::NAN).is_err());
        assert!(pool.is_empty());
    }

    #[test]
    fn fractional_stock_keeps_whole_units() {
        let mut pool = WarehouseStock::new();
        pool.add("W1", "P1", 29.04).unwrap();
        assert_eq!(pool.available("W1", "P1"), 29.0);

        let pool = WarehouseStock::from_lines(vec![line("W1", "P2", 0.6), line("W1", "P2", 0.6)])
            .unwrap();
        assert_eq!(pool.available("W1", "P2"), 0.0);
    }
}
