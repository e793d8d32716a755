// src/engine/allocator.rs

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::model::outcome::{AllocationResult, NeedRecord};
use crate::model::pool::WarehouseStock;

/// Allocation order: larger need first, then store id, product id and input row.
pub fn priority_order(a: &NeedRecord, b: &NeedRecord) -> Ordering {
    b.need
        .total_cmp(&a.need)
        .then_with(|| a.record.store_id.cmp(&b.record.store_id))
        .then_with(|| a.record.product_id.cmp(&b.record.product_id))
        .then_with(|| a.row.cmp(&b.row))
}

/// Distributes warehouse stock over every positive need, largest first.
///
/// Single greedy pass with no backtracking: a large need may take all of a
/// shared warehouse line before a smaller one for the same product sees any
/// of it. A need whose warehouse line is missing ships nothing.
///
/// Needs and pool lines are whole units, so `shipped + unmet == need` holds
/// exactly. The pool is consumed. Results come back in input order, one per
/// record; records without need get zero shipped and zero unmet.
pub fn allocate(need_records: Vec<NeedRecord>, mut pool: WarehouseStock) -> Vec<AllocationResult> {
    let mut queue: Vec<usize> = (0..need_records.len())
        .filter(|&i| need_records[i].has_need())
        .collect();
    queue.sort_by(|&a, &b| priority_order(&need_records[a], &need_records[b]));

    let mut shipped = vec![0.0_f64; need_records.len()];
    let mut priority: Vec<Option<usize>> = vec![None; need_records.len()];

    for (rank, &i) in queue.iter().enumerate() {
        let nr = &need_records[i];
        let record = &nr.record;

        if !pool.contains(&record.warehouse_id, &record.product_id) {
            warn!(
                store = %record.store_id,
                product = %record.product_id,
                warehouse = %record.warehouse_id,
                need = nr.need,
                "no warehouse line for need"
            );
        }

        shipped[i] = pool.take(&record.warehouse_id, &record.product_id, nr.need);
        priority[i] = Some(rank);

        debug!(
            rank,
            store = %record.store_id,
            product = %record.product_id,
            need = nr.need,
            shipped = shipped[i],
            "allocated"
        );
    }

    need_records
        .into_iter()
        .zip(shipped)
        .zip(priority)
        .map(|((need_record, shipped_units), priority)| {
            let unmet_units = need_record.need - shipped_units;
            AllocationResult {
                need_record,
                shipped_units,
                unmet_units,
                priority,
            }
        })
        .collect()
}
