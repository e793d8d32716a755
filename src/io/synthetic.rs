// src/io/synthetic.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::{ReplenishmentError, Result};
use crate::model::pool::WarehouseLine;
use crate::model::record::InventoryRecord;

/// Shape of a generated snapshot.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub stores: usize,
    pub products: usize,
    pub warehouses: usize,
    pub seed: u64,
    /// Mean weekly sales per store/product line.
    pub mean_weekly_sales: f64,
    /// Standard deviation of weekly sales.
    pub sales_std_dev: f64,
    /// Share of warehouse/product lines left out of the warehouse snapshot.
    pub missing_line_ratio: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            stores: 20,
            products: 50,
            warehouses: 2,
            seed: 42,
            mean_weekly_sales: 4.0,
            sales_std_dev: 2.0,
            missing_line_ratio: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSnapshot {
    pub records: Vec<InventoryRecord>,
    pub warehouse_lines: Vec<WarehouseLine>,
}

/// Generates a reproducible inventory and warehouse snapshot.
///
/// Store `i` is served by warehouse `i % warehouses`. Weekly sales follow a
/// Normal distribution, rounded and clamped at zero. The same seed always gives
/// the same snapshot.
pub fn generate_snapshot(config: &SyntheticConfig) -> Result<SyntheticSnapshot> {
    if config.warehouses == 0 && config.stores > 0 {
        return Err(ReplenishmentError::invalid_parameter(
            "warehouses",
            "at least one warehouse is needed to serve stores",
        ));
    }
    if !(0.0..=1.0).contains(&config.missing_line_ratio) {
        return Err(ReplenishmentError::invalid_parameter(
            "missing_line_ratio",
            format!("must be within 0..=1, got {}", config.missing_line_ratio),
        ));
    }
    let normal = Normal::new(config.mean_weekly_sales, config.sales_std_dev)
        .map_err(|e| ReplenishmentError::invalid_parameter("sales_std_dev", e.to_string()))?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut records = Vec::with_capacity(config.stores * config.products);

    for s in 0..config.stores {
        let warehouse_id = warehouse_name(s % config.warehouses);
        for p in 0..config.products {
            let sales = normal.sample(&mut rng).round().max(0.0);
            let min_threshold = rng.gen_range(2..=5) as f64;
            let max_threshold = min_threshold + rng.gen_range(10..=20) as f64;

            records.push(InventoryRecord {
                store_id: format!("S{:03}", s + 1),
                product_id: product_name(p),
                warehouse_id: warehouse_id.clone(),
                current_store_stock: rng.gen_range(0..=30) as f64,
                in_transit_units: rng.gen_range(0..=5) as f64,
                weekly_sales_rate: sales,
                min_threshold,
                max_threshold,
                target_cover_weeks: rng.gen_range(2..=6) as f64,
                category_id: Some(format!("{}", 11 + p % 4)),
                brand_id: Some(format!("B{}", p % 5 + 1)),
            });
        }
    }

    let mut warehouse_lines = Vec::new();
    for w in 0..config.warehouses {
        for p in 0..config.products {
            if rng.gen_bool(config.missing_line_ratio) {
                continue;
            }
            warehouse_lines.push(WarehouseLine {
                warehouse_id: warehouse_name(w),
                product_id: product_name(p),
                available_units: rng.gen_range(0..=200) as f64,
            });
        }
    }

    Ok(SyntheticSnapshot {
        records,
        warehouse_lines,
    })
}

fn warehouse_name(index: usize) -> String {
    format!("W{}", index + 1)
}

fn product_name(index: usize) -> String {
    format!("P{:04}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::validate_records;

    #[test]
    fn same_seed_same_snapshot() {
        let config = SyntheticConfig::default();
        assert_eq!(
            generate_snapshot(&config).unwrap(),
            generate_snapshot(&config).unwrap()
        );
    }

    #[test]
    fn snapshot_is_valid_and_sized() {
        let config = SyntheticConfig {
            stores: 3,
            products: 4,
            warehouses: 2,
            missing_line_ratio: 0.0,
            ..SyntheticConfig::default()
        };
        let snapshot = generate_snapshot(&config).unwrap();
        assert_eq!(snapshot.records.len(), 12);
        assert_eq!(snapshot.warehouse_lines.len(), 8);
        assert!(validate_records(&snapshot.records).is_ok());
        assert_eq!(snapshot.records[4].warehouse_id, "W2");
        assert!(snapshot
            .records
            .iter()
            .all(|r| r.max_threshold > r.min_threshold));
    }

    #[test]
    fn stores_without_warehouses_are_rejected() {
        let config = SyntheticConfig {
            warehouses: 0,
            ..SyntheticConfig::default()
        };
        assert!(generate_snapshot(&config).is_err());
    }

    #[test]
    fn negative_deviation_is_rejected() {
        let config = SyntheticConfig {
            sales_std_dev: -1.0,
            ..SyntheticConfig::default()
        };
        assert!(generate_snapshot(&config).is_err());
    }
}
