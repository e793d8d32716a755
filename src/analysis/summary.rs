// src/analysis/summary.rs

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::model::outcome::AllocationResult;

/// Run-level totals handed to the reporting layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationSummary {
    pub total_need: f64,
    pub total_shipped: f64,
    pub total_unmet: f64,
    /// Shipped as a percentage of need; 0 when nothing was needed.
    pub fulfillment_rate: f64,

    // Distinct ids among records with a positive need
    pub product_count: usize,
    pub store_count: usize,
    pub warehouse_count: usize,

    pub shipped_by_warehouse: BTreeMap<String, f64>,

    /// True when the run found nothing to replenish, including an empty input.
    pub no_replenishment_required: bool,
}

impl AllocationSummary {
    pub fn empty() -> Self {
        Self {
            total_need: 0.0,
            total_shipped: 0.0,
            total_unmet: 0.0,
            fulfillment_rate: 0.0,
            product_count: 0,
            store_count: 0,
            warehouse_count: 0,
            shipped_by_warehouse: BTreeMap::new(),
            no_replenishment_required: true,
        }
    }
}

/// Shipped units as a percentage of need.
pub fn fulfillment_rate(total_shipped: f64, total_need: f64) -> f64 {
    if total_need > 0.0 {
        total_shipped / total_need * 100.0
    } else {
        0.0
    }
}

pub fn summarize(results: &[AllocationResult]) -> AllocationSummary {
    let mut summary = AllocationSummary::empty();
    let mut products = BTreeSet::new();
    let mut stores = BTreeSet::new();

    for result in results.iter().filter(|r| r.need() > 0.0) {
        summary.total_need += result.need();
        summary.total_shipped += result.shipped_units;
        summary.total_unmet += result.unmet_units;

        products.insert(result.product_id());
        stores.insert(result.store_id());
        *summary
            .shipped_by_warehouse
            .entry(result.warehouse_id().to_owned())
            .or_insert(0.0) += result.shipped_units;
    }

    summary.fulfillment_rate = fulfillment_rate(summary.total_shipped, summary.total_need);
    summary.product_count = products.len();
    summary.store_count = stores.len();
    summary.warehouse_count = summary.shipped_by_warehouse.len();
    summary.no_replenishment_required = summary.total_need <= 0.0;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::allocator::allocate;
    use crate::model::pool::WarehouseStock;
    use crate::model::record::InventoryRecord;
    use crate::strategy::need::compute_need;
    use crate::strategy::traits::Multipliers;

    fn results() -> Vec<AllocationResult> {
        let records = [
            InventoryRecord::new("S1", "P1", "W1").with_thresholds(50.0, 50.0),
            InventoryRecord::new("S2", "P1", "W1").with_thresholds(30.0, 30.0),
            InventoryRecord::new("S2", "P2", "W2").with_thresholds(20.0, 20.0),
            InventoryRecord::new("S3", "P3", "W3").with_stock(9.0, 0.0),
        ];
        let needs = records
            .iter()
            .enumerate()
            .map(|(row, r)| {
                let mut nr = compute_need(r, 7.0, &Multipliers::default());
                nr.row = row;
                nr
            })
            .collect();
        let mut pool = WarehouseStock::new();
        pool.add("W1", "P1", 60.0).unwrap();
        allocate(needs, pool)
    }

    #[test]
    fn totals_and_rate() {
        let summary = summarize(&results());
        assert_eq!(summary.total_need, 100.0);
        assert_eq!(summary.total_shipped, 60.0);
        assert_eq!(summary.total_unmet, 40.0);
        assert_eq!(summary.fulfillment_rate, 60.0);
        assert!(!summary.no_replenishment_required);
    }

    #[test]
    fn counts_only_lines_with_need() {
        let summary = summarize(&results());
        assert_eq!(summary.product_count, 2);
        assert_eq!(summary.store_count, 2);
        assert_eq!(summary.warehouse_count, 2);
        assert_eq!(summary.shipped_by_warehouse["W1"], 60.0);
        assert_eq!(summary.shipped_by_warehouse["W2"], 0.0);
        assert!(!summary.shipped_by_warehouse.contains_key("W3"));
    }

    #[test]
    fn nothing_needed_means_no_replenishment() {
        let summary = summarize(&[]);
        assert_eq!(summary, AllocationSummary::empty());
        assert_eq!(summary.fulfillment_rate, 0.0);
        assert!(summary.no_replenishment_required);
    }
}
